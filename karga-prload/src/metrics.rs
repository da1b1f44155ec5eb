use hdrhistogram::Histogram;
use karga::{Aggregate, Metric, Report};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    time::Duration,
};

/// Outcome of one request issued by a simulated user.
#[derive(Clone, Debug, PartialEq, PartialOrd)]
pub struct RequestSample {
    pub name: &'static str,
    pub latency: Duration,
    // None when the request never got a response (connect error, timeout)
    pub status: Option<u16>,
    pub bytes_received: u64,
}

impl RequestSample {
    pub fn is_failure(&self) -> bool {
        self.status.map_or(true, |status| status >= 400)
    }
}

/// Everything one user step sent. A step may issue zero, one or two requests.
#[derive(Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct ActionMetric {
    pub samples: Vec<RequestSample>,
}

impl Metric for ActionMetric {}

#[derive(Clone)]
pub struct EndpointAggregate {
    pub latency_hist: Histogram<u64>,
    pub status_count: HashMap<u16, u64>,
    pub total_bytes_received: u64,
    pub count: u64,
    pub failure_count: u64,
}

impl Default for EndpointAggregate {
    fn default() -> Self {
        Self {
            latency_hist: Histogram::new(3).expect("Create histogram"),
            status_count: HashMap::new(),
            total_bytes_received: 0,
            count: 0,
            failure_count: 0,
        }
    }
}

impl EndpointAggregate {
    fn consume(&mut self, sample: &RequestSample) {
        self.count += 1;
        if sample.is_failure() {
            self.failure_count += 1;
        }
        if let Some(status) = sample.status {
            *self.status_count.entry(status).or_default() += 1;
        }
        self.total_bytes_received += sample.bytes_received;
        if let Err(res) = self.latency_hist.record(sample.latency.as_nanos() as u64) {
            tracing::warn!("Ignoring latency reading due to error: {res}");
        }
    }

    fn merge(&mut self, other: Self) {
        self.latency_hist += other.latency_hist;
        for (status_code, other_count) in other.status_count {
            *self.status_count.entry(status_code).or_default() += other_count;
        }
        self.total_bytes_received += other.total_bytes_received;
        self.failure_count += other.failure_count;
        self.count += other.count;
    }
}

/// Totals plus a breakdown by request name.
#[derive(Clone)]
pub struct LoadAggregate {
    pub total: EndpointAggregate,
    pub endpoints: HashMap<&'static str, EndpointAggregate>,
    pub actions: u64,
}

impl Aggregate for LoadAggregate {
    type Metric = ActionMetric;

    fn new() -> Self {
        Self {
            total: EndpointAggregate::default(),
            endpoints: HashMap::new(),
            actions: 0,
        }
    }

    fn consume(&mut self, metric: &Self::Metric) {
        for sample in &metric.samples {
            self.total.consume(sample);
            self.endpoints.entry(sample.name).or_default().consume(sample);
        }
        self.actions += 1;
    }

    fn merge(&mut self, other: Self) {
        self.total.merge(other.total);
        for (name, endpoint) in other.endpoints {
            self.endpoints.entry(name).or_default().merge(endpoint);
        }
        self.actions += other.actions;
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LatencyStats {
    pub avg: Duration,
    pub min: Duration,
    pub med: Duration,
    pub max: Duration,
    pub p90: Duration,
    pub p95: Duration,
}

impl From<&Histogram<u64>> for LatencyStats {
    fn from(hist: &Histogram<u64>) -> Self {
        Self {
            avg: Duration::from_nanos(hist.mean() as u64),
            min: Duration::from_nanos(hist.min()),
            med: Duration::from_nanos(hist.value_at_quantile(0.5)),
            max: Duration::from_nanos(hist.max()),
            p90: Duration::from_nanos(hist.value_at_quantile(0.90)),
            p95: Duration::from_nanos(hist.value_at_quantile(0.95)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EndpointReport {
    pub req_duration: LatencyStats,
    pub reqs_total: u64,
    pub failures: u64,
    pub status_codes: BTreeMap<u16, u64>,
    pub data_received: u64,
}

impl From<EndpointAggregate> for EndpointReport {
    fn from(value: EndpointAggregate) -> Self {
        Self {
            req_duration: LatencyStats::from(&value.latency_hist),
            reqs_total: value.count,
            failures: value.failure_count,
            status_codes: value.status_count.into_iter().collect(),
            data_received: value.total_bytes_received,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub actions: u64,
    pub reqs_total: u64,
    pub failures_total: u64,
    /// Percentage of successful requests; absent when nothing was sent.
    pub success_rate: Option<f64>,
    pub total: EndpointReport,
    pub endpoints: BTreeMap<String, EndpointReport>,
}

impl From<LoadAggregate> for LoadReport {
    fn from(value: LoadAggregate) -> Self {
        let reqs_total = value.total.count;
        let failures_total = value.total.failure_count;
        let success_rate = (reqs_total > 0)
            .then(|| (1.0 - failures_total as f64 / reqs_total as f64) * 100.0);

        Self {
            actions: value.actions,
            reqs_total,
            failures_total,
            success_rate,
            total: value.total.into(),
            endpoints: value
                .endpoints
                .into_iter()
                .map(|(name, endpoint)| (name.to_string(), endpoint.into()))
                .collect(),
        }
    }
}

impl Report<LoadAggregate> for LoadReport {}
