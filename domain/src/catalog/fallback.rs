//! Curated static catalog used when the remote index cannot be fetched

use super::entities::{CatalogOrigin, ServiceCatalog};

const STATIC_SERVICES: &[(&str, &str)] = &[
    // Compute
    ("amazon ec2", "AmazonEC2"),
    ("aws lambda", "AWSLambda"),
    ("amazon lightsail", "AmazonLightsail"),
    ("amazon ecs", "AmazonECS"),
    ("amazon eks", "AmazonEKS"),
    // Storage
    ("amazon s3", "AmazonS3"),
    ("amazon efs", "AmazonEFS"),
    ("amazon fsx", "AmazonFSx"),
    // Database
    ("amazon rds", "AmazonRDS"),
    ("amazon dynamodb", "AmazonDynamoDB"),
    ("amazon redshift", "AmazonRedshift"),
    ("amazon elasticache", "AmazonElastiCache"),
    // AI / ML
    ("amazon bedrock", "AmazonBedrock"),
    ("amazon sagemaker", "AmazonSageMaker"),
    ("amazon rekognition", "AmazonRekognition"),
    ("amazon comprehend", "AmazonComprehend"),
    // Networking
    ("amazon cloudfront", "AmazonCloudFront"),
    ("amazon route 53", "AmazonRoute53"),
    ("amazon vpc", "AmazonVPC"),
    ("elastic load balancing", "AWSELB"),
    // Other
    ("amazon sns", "AmazonSNS"),
    ("amazon sqs", "AmazonSQS"),
    ("amazon cloudwatch", "AmazonCloudWatch"),
    ("aws iam", "AmazonIdentityManagement"),
    ("aws config", "AWSConfig"),
    ("aws cloudtrail", "AWSCloudTrail"),
];

/// The static catalog covering the most commonly discussed services.
pub fn static_catalog() -> ServiceCatalog {
    STATIC_SERVICES
        .iter()
        .fold(ServiceCatalog::new(CatalogOrigin::Static), |catalog, (name, code)| {
            catalog.with_service(name, *code)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::aliases::AliasTable;
    use crate::catalog::entities::SubstringPolicy;

    #[test]
    fn test_static_catalog_contents() {
        let catalog = static_catalog();
        assert_eq!(catalog.origin(), CatalogOrigin::Static);
        assert_eq!(catalog.len(), STATIC_SERVICES.len());
        assert!(catalog.contains_code("AmazonEC2"));
    }

    #[test]
    fn test_every_alias_target_resolves() {
        // Each alias must land on an entry of the static table
        let catalog = static_catalog();
        let aliases = AliasTable::default();
        for alias in ["ec2", "alb", "dns", "dynamo", "ebs", "iam", "cdn"] {
            assert!(
                catalog
                    .find_code(alias, &aliases, SubstringPolicy::RejectAmbiguous)
                    .is_some(),
                "alias {alias} did not resolve"
            );
        }
    }
}
