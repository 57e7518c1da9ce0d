use crate::errors::AppError;
use crate::repositories::{CATEGORY_INDEX, RECENCY_INDEX, SLUG_INDEX};
use aws_sdk_dynamodb::{
    error::SdkError as DynamoSdkError,
    types::{
        AttributeDefinition, BillingMode, GlobalSecondaryIndex, KeySchemaElement, KeyType, Projection,
        ProjectionType, ScalarAttributeType,
    },
    Client as DynamoDbClient,
};
use tracing;

fn attribute(name: &str, attribute_type: ScalarAttributeType) -> Result<AttributeDefinition, AppError> {
    Ok(AttributeDefinition::builder()
        .attribute_name(name)
        .attribute_type(attribute_type)
        .build()?)
}

fn key(name: &str, key_type: KeyType) -> Result<KeySchemaElement, AppError> {
    Ok(KeySchemaElement::builder().attribute_name(name).key_type(key_type).build()?)
}

/// A GSI sorted by `created_at`, projecting every attribute.
fn recency_sorted_index(index_name: &str, partition_attr: &str) -> Result<GlobalSecondaryIndex, AppError> {
    Ok(GlobalSecondaryIndex::builder()
        .index_name(index_name)
        .key_schema(key(partition_attr, KeyType::Hash)?)
        .key_schema(key("created_at", KeyType::Range)?)
        .projection(Projection::builder().projection_type(ProjectionType::All).build())
        .build()?)
}

/// Creates the prompts table and its secondary indexes if it doesn't exist.
async fn create_prompts_table_if_not_exists(client: &DynamoDbClient, table_name: &str) -> Result<(), AppError> {
    let result = client
        .create_table()
        .table_name(table_name)
        .attribute_definitions(attribute("id", ScalarAttributeType::S)?)
        .attribute_definitions(attribute("feed", ScalarAttributeType::S)?)
        .attribute_definitions(attribute("category", ScalarAttributeType::S)?)
        .attribute_definitions(attribute("slug", ScalarAttributeType::S)?)
        .attribute_definitions(attribute("created_at", ScalarAttributeType::N)?)
        .key_schema(key("id", KeyType::Hash)?)
        .global_secondary_indexes(recency_sorted_index(RECENCY_INDEX, "feed")?)
        .global_secondary_indexes(recency_sorted_index(CATEGORY_INDEX, "category")?)
        .global_secondary_indexes(recency_sorted_index(SLUG_INDEX, "slug")?)
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await;
    match result {
        Ok(_) => {
            tracing::info!("Startup: Table '{}' created successfully or setup initiated.", table_name);
            Ok(())
        }
        Err(e) => {
            if let DynamoSdkError::ServiceError(service_err) = &e {
                if service_err.err().is_resource_in_use_exception() {
                    tracing::info!("Startup: Table '{}' already exists, no action needed.", table_name);
                    Ok(())
                } else {
                    let context = format!("Startup: Service error creating DynamoDB table '{}'", table_name);
                    tracing::error!("{}: {:?}", context, service_err);
                    Err(AppError::InitError(format!("{}: {}", context, e)))
                }
            } else {
                let context = format!("Startup: SDK error creating DynamoDB table '{}'", table_name);
                tracing::error!("{}: {}", context, e);
                Err(AppError::InitError(format!("{}: {}", context, e)))
            }
        }
    }
}

/// Initializes required AWS resources.
pub async fn init_resources(db_client: &DynamoDbClient, table_name: &str) -> Result<(), AppError> {
    tracing::info!("Startup: Initializing AWS resources...");
    create_prompts_table_if_not_exists(db_client, table_name).await?;
    tracing::info!("Startup: AWS resource initialization complete.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recency_index_shape() {
        let index = recency_sorted_index(SLUG_INDEX, "slug").unwrap();
        assert_eq!(index.index_name(), SLUG_INDEX);
        let keys: Vec<_> = index
            .key_schema()
            .iter()
            .map(|k| (k.attribute_name().to_string(), k.key_type().clone()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("slug".to_string(), KeyType::Hash),
                ("created_at".to_string(), KeyType::Range),
            ]
        );
    }
}
