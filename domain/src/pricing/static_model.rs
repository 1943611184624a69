//! Deterministic offline pricing model
//!
//! `cost = base[code] × region[region] × instance[type]`, each table with a
//! default for unknown keys. The figures are ballpark list prices for a small
//! always-on footprint; they exist so an estimate can always be produced,
//! not to be quoted.

use super::entities::{CostEstimate, EstimateSource, ServiceConfig};

pub const DEFAULT_BASE_COST: f64 = 30.0;
pub const DEFAULT_MULTIPLIER: f64 = 1.0;
pub const DEFAULT_REDUCTION_RATE: f64 = 0.15;

pub const STATIC_NOTE: &str =
    "Static estimate from built-in reference prices; not an authoritative AWS quote.";

const BASE_COSTS: &[(&str, f64)] = &[
    ("AmazonEC2", 25.0),
    ("AmazonS3", 23.0),
    ("AmazonRDS", 50.0),
    ("AWSLambda", 5.0),
    ("AmazonDynamoDB", 25.0),
    ("AmazonCloudFront", 85.0),
    ("AmazonVPC", 32.0),
    ("AWSELB", 22.0),
    ("AmazonECS", 30.0),
    ("AmazonEKS", 73.0),
    ("AmazonElastiCache", 25.0),
    ("AmazonRedshift", 180.0),
    ("AmazonSNS", 2.0),
    ("AmazonSQS", 2.0),
    ("AmazonCloudWatch", 10.0),
    ("AmazonRoute53", 1.0),
    ("AmazonEFS", 30.0),
    ("AmazonBedrock", 50.0),
    ("AmazonSageMaker", 100.0),
];

const REGION_MULTIPLIERS: &[(&str, f64)] = &[
    ("us-east-1", 1.0),
    ("us-east-2", 1.0),
    ("us-west-1", 1.08),
    ("us-west-2", 1.05),
    ("eu-west-1", 1.1),
    ("eu-central-1", 1.12),
    ("ap-northeast-1", 1.15),
    ("ap-southeast-1", 1.12),
    ("ap-southeast-2", 1.14),
    ("ap-south-1", 1.05),
    ("sa-east-1", 1.3),
];

const INSTANCE_MULTIPLIERS: &[(&str, f64)] = &[
    ("t3.nano", 0.25),
    ("t3.micro", 0.5),
    ("t3.small", 1.0),
    ("t3.medium", 1.5),
    ("t3.large", 3.0),
    ("t3.xlarge", 6.0),
    ("m5.large", 3.5),
    ("m5.xlarge", 7.0),
    ("c5.large", 3.2),
    ("r5.large", 4.6),
    ("db.t3.micro", 0.5),
    ("db.t3.small", 1.0),
    ("db.t3.medium", 2.0),
    ("db.r5.large", 6.0),
];

fn lookup(table: &[(&str, f64)], key: &str, default: f64) -> f64 {
    table
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map_or(default, |(_, v)| *v)
}

pub fn base_cost(service_code: &str) -> f64 {
    lookup(BASE_COSTS, service_code.trim(), DEFAULT_BASE_COST)
}

pub fn region_multiplier(region: &str) -> f64 {
    lookup(REGION_MULTIPLIERS, region.trim(), DEFAULT_MULTIPLIER)
}

pub fn instance_multiplier(instance_type: Option<&str>) -> f64 {
    instance_type.map_or(DEFAULT_MULTIPLIER, |t| {
        lookup(INSTANCE_MULTIPLIERS, t.trim(), DEFAULT_MULTIPLIER)
    })
}

/// Broad service family, used to pick advice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceCategory {
    Compute,
    Containers,
    Serverless,
    Database,
    Storage,
    Network,
    Analytics,
    MachineLearning,
    Messaging,
    Other,
}

impl ServiceCategory {
    /// Classify a canonical code (or a pseudo-code built from user input)
    pub fn of(service_code: &str) -> Self {
        let code = service_code.to_ascii_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| code.contains(n));

        if has(&["lambda", "fargate"]) {
            ServiceCategory::Serverless
        } else if has(&["ecs", "eks", "ecr", "container"]) {
            ServiceCategory::Containers
        } else if has(&["rds", "dynamodb", "aurora", "elasticache", "docdb", "neptune", "db"]) {
            ServiceCategory::Database
        } else if has(&["s3", "efs", "glacier", "fsx", "storage", "backup"]) {
            ServiceCategory::Storage
        } else if has(&["cloudfront", "vpc", "elb", "route53", "gateway", "directconnect"]) {
            ServiceCategory::Network
        } else if has(&["redshift", "athena", "glue", "kinesis", "emr", "opensearch", "amazones"]) {
            ServiceCategory::Analytics
        } else if has(&["sagemaker", "bedrock", "rekognition", "comprehend"]) {
            ServiceCategory::MachineLearning
        } else if has(&["sns", "sqs", "eventbridge", "mq"]) {
            ServiceCategory::Messaging
        } else if has(&["ec2", "lightsail", "compute"]) {
            ServiceCategory::Compute
        } else {
            ServiceCategory::Other
        }
    }

    /// General advice and expected reduction for the family
    pub fn advice(&self) -> (&'static str, f64) {
        match self {
            ServiceCategory::Compute => (
                "Use Compute Savings Plans for steady usage and right-size instances from CloudWatch utilization.",
                0.25,
            ),
            ServiceCategory::Containers => (
                "Run stateless tasks on Spot capacity and right-size task CPU and memory reservations.",
                0.25,
            ),
            ServiceCategory::Serverless => (
                "Tune memory size with power tuning and move to arm64 (Graviton) runtimes.",
                0.2,
            ),
            ServiceCategory::Database => (
                "Purchase Reserved Instances for always-on databases and stop non-production instances off-hours.",
                0.35,
            ),
            ServiceCategory::Storage => (
                "Enable lifecycle policies or Intelligent-Tiering to move infrequently accessed data to cheaper tiers.",
                0.4,
            ),
            ServiceCategory::Network => (
                "Cache aggressively at the edge and keep traffic within a single AZ where possible to cut transfer charges.",
                0.15,
            ),
            ServiceCategory::Analytics => (
                "Pause or resize clusters outside business hours and consider reserved nodes for steady workloads.",
                0.3,
            ),
            ServiceCategory::MachineLearning => (
                "Use Spot training jobs and shut down idle endpoints; batch inference where latency allows.",
                0.3,
            ),
            ServiceCategory::Messaging => (
                "Batch messages and use long polling to reduce request counts.",
                0.1,
            ),
            ServiceCategory::Other => (
                "Review usage in Cost Explorer and remove idle resources.",
                DEFAULT_REDUCTION_RATE,
            ),
        }
    }
}

/// Advice and reduction rate from instance family, then service family
pub fn static_advice(service_code: &str, instance_type: Option<&str>) -> (String, f64) {
    if let Some(instance) = instance_type.map(str::to_ascii_lowercase) {
        let family = instance.trim_start_matches("db.").trim_start_matches("cache.");
        let burstable = family.starts_with('t') && family.chars().nth(1).is_some_and(|c| c.is_ascii_digit());

        if instance.starts_with("db.") {
            return (
                format!(
                    "{instance}: purchase a 1-year Reserved Instance for always-on databases and review storage autoscaling."
                ),
                0.35,
            );
        }
        if burstable {
            return (
                format!(
                    "{instance} is burstable: a 1-year Reserved Instance or Savings Plan cuts steady usage cost; watch CPU credit balance before upsizing."
                ),
                0.3,
            );
        }
    }

    let (advice, rate) = ServiceCategory::of(service_code).advice();
    (advice.to_string(), rate)
}

/// Monthly cost from the static tables
pub fn static_monthly_cost(service_code: &str, region: &str, instance_type: Option<&str>) -> f64 {
    base_cost(service_code) * region_multiplier(region) * instance_multiplier(instance_type)
}

/// Complete static-tier estimate. Pure computation, always succeeds.
pub fn static_estimate(service_code: &str, config: &ServiceConfig) -> CostEstimate {
    let region = config.effective_region();
    let instance = config.effective_instance_type();
    let cost = static_monthly_cost(service_code, region, instance);
    let (advice, rate) = static_advice(service_code, instance);

    CostEstimate::new(EstimateSource::StaticFallback, cost)
        .with_detail(format!(
            "{service_code}: base ${:.2} × region {region} ({:.2}) × instance {} ({:.2})",
            base_cost(service_code),
            region_multiplier(region),
            instance.unwrap_or("default"),
            instance_multiplier(instance),
        ))
        .with_advice(advice, rate)
        .with_current_state(config.describe())
        .with_note(STATIC_NOTE)
}
