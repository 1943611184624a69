//! Local content served by the built-in fallback handlers

const VPC_TEMPLATE: &str = r#"# Basic VPC layout
resource "aws_vpc" "main" {
  cidr_block           = "10.0.0.0/16"
  enable_dns_hostnames = true
  enable_dns_support   = true

  tags = {
    Name = "main-vpc"
  }
}

data "aws_availability_zones" "available" {
  state = "available"
}

resource "aws_subnet" "public" {
  vpc_id                  = aws_vpc.main.id
  cidr_block              = "10.0.1.0/24"
  availability_zone       = data.aws_availability_zones.available.names[0]
  map_public_ip_on_launch = true

  tags = {
    Name = "public-subnet"
  }
}

resource "aws_internet_gateway" "main" {
  vpc_id = aws_vpc.main.id

  tags = {
    Name = "main-igw"
  }
}
"#;

const LAMBDA_TEMPLATE: &str = r#"# Basic Lambda function
resource "aws_lambda_function" "main" {
  filename         = "lambda.zip"
  function_name    = "main-function"
  role             = aws_iam_role.lambda_role.arn
  handler          = "index.handler"
  source_code_hash = filebase64sha256("lambda.zip")
  runtime          = "python3.12"

  tags = {
    Name = "main-lambda"
  }
}

resource "aws_iam_role" "lambda_role" {
  name = "lambda-execution-role"

  assume_role_policy = jsonencode({
    Version = "2012-10-17"
    Statement = [
      {
        Action = "sts:AssumeRole"
        Effect = "Allow"
        Principal = {
          Service = "lambda.amazonaws.com"
        }
      }
    ]
  })
}
"#;

const EC2_TEMPLATE: &str = r#"# Basic EC2 instance
data "aws_ami" "al2023" {
  most_recent = true
  owners      = ["amazon"]

  filter {
    name   = "name"
    values = ["al2023-ami-*-x86_64"]
  }
}

resource "aws_instance" "main" {
  ami           = data.aws_ami.al2023.id
  instance_type = "t3.micro"

  metadata_options {
    http_tokens = "required"
  }

  tags = {
    Name = "main-instance"
  }
}
"#;

const GENERIC_TEMPLATE: &str =
    "# Describe the resources you need (for example \"VPC with public subnet\" or \"Lambda function\") to get a starter template.\n";

/// Starter Terraform for the resource named in `requirements`
pub fn terraform_template(requirements: &str) -> &'static str {
    let requirements = requirements.to_lowercase();
    if requirements.contains("vpc") {
        VPC_TEMPLATE
    } else if requirements.contains("lambda") {
        LAMBDA_TEMPLATE
    } else if requirements.contains("ec2") || requirements.contains("instance") {
        EC2_TEMPLATE
    } else {
        GENERIC_TEMPLATE
    }
}

const SERVICE_DESCRIPTIONS: &[(&str, &str)] = &[
    (
        "ec2",
        "Amazon EC2 provides secure, resizable virtual servers in the cloud.",
    ),
    (
        "s3",
        "Amazon S3 is object storage offering industry-leading scalability, data availability, security and performance.",
    ),
    (
        "rds",
        "Amazon RDS makes it easy to set up, operate and scale a relational database in the cloud.",
    ),
    (
        "lambda",
        "AWS Lambda runs code without provisioning or managing servers.",
    ),
];

pub const GENERAL_DOCUMENTATION_HINT: &str = "Refer to the official AWS documentation for details.";

/// `(service key, description)` for the first known service named in `query`
pub fn service_description(query: &str) -> Option<(&'static str, &'static str)> {
    let query = query.to_lowercase();
    SERVICE_DESCRIPTIONS
        .iter()
        .find(|(service, _)| query.contains(service))
        .copied()
}

/// Architecture guidance keyed on the topic of `prompt`
pub fn core_guidance(prompt: &str) -> &'static str {
    let prompt = prompt.to_lowercase();
    let mentions = |keywords: &[&str]| keywords.iter().any(|k| prompt.contains(k));

    if mentions(&["vpc", "network", "subnet"]) {
        "For VPC design, separate public and private subnets, spread across multiple AZs and keep route tables explicit."
    } else if mentions(&["lambda", "serverless"]) {
        "For serverless designs, keep functions event-driven, scope IAM permissions tightly and plan for cold starts."
    } else if mentions(&["rds", "database"]) {
        "For databases, use Multi-AZ, define a backup strategy, restrict security groups and enable encryption at rest."
    } else {
        "Follow the AWS Well-Architected Framework: design for reliability, security, cost efficiency and performance."
    }
}
