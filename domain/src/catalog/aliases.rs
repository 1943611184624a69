//! Abbreviation and colloquial-name aliases for AWS services

use std::collections::HashMap;

/// Lowercase alias -> canonical lowercase display name
#[derive(Debug, Clone)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
}

impl AliasTable {
    /// An empty table (no alias resolution).
    pub fn empty() -> Self {
        Self {
            aliases: HashMap::new(),
        }
    }

    /// Register an alias (builder pattern)
    pub fn with_alias(mut self, alias: &str, display_name: &str) -> Self {
        self.aliases
            .insert(alias.trim().to_lowercase(), display_name.trim().to_lowercase());
        self
    }

    /// Resolve an already-normalized alias to its display name
    pub fn resolve(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        DEFAULT_ALIASES
            .iter()
            .fold(Self::empty(), |table, (alias, name)| table.with_alias(alias, name))
    }
}

const DEFAULT_ALIASES: &[(&str, &str)] = &[
    // Compute
    ("ec2", "amazon ec2"),
    ("lambda", "aws lambda"),
    ("lightsail", "amazon lightsail"),
    ("ecs", "amazon ecs"),
    ("eks", "amazon eks"),
    // Fargate is billed under ECS
    ("fargate", "amazon ecs"),
    // Storage
    ("s3", "amazon s3"),
    ("simple storage service", "amazon s3"),
    ("efs", "amazon efs"),
    ("fsx", "amazon fsx"),
    // EBS volumes are billed under EC2
    ("ebs", "amazon ec2"),
    ("elastic block store", "amazon ec2"),
    // Database
    ("rds", "amazon rds"),
    ("relational database service", "amazon rds"),
    ("dynamo", "amazon dynamodb"),
    ("dynamodb", "amazon dynamodb"),
    ("redshift", "amazon redshift"),
    ("elasticache", "amazon elasticache"),
    // AI / ML
    ("bedrock", "amazon bedrock"),
    ("sagemaker", "amazon sagemaker"),
    ("rekognition", "amazon rekognition"),
    ("comprehend", "amazon comprehend"),
    // Networking
    ("cloudfront", "amazon cloudfront"),
    ("cdn", "amazon cloudfront"),
    ("route53", "amazon route 53"),
    ("route 53", "amazon route 53"),
    ("dns", "amazon route 53"),
    ("vpc", "amazon vpc"),
    ("elb", "elastic load balancing"),
    ("load balancer", "elastic load balancing"),
    ("alb", "elastic load balancing"),
    ("nlb", "elastic load balancing"),
    // Other
    ("sns", "amazon sns"),
    ("sqs", "amazon sqs"),
    ("cloudwatch", "amazon cloudwatch"),
    ("iam", "aws iam"),
    ("config", "aws config"),
    ("cloudtrail", "aws cloudtrail"),
];
