use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use todo_lambda::adapters::attachments::S3AttachmentStore;
use todo_lambda::adapters::dynamodb::DynamoTodoStore;
use todo_lambda::config::ApiConfig;
use todo_lambda::handlers::api::{handle_api_event, ApiGatewayResponse};
use todo_lambda::TodoService;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_current_span(false)
                .with_target(false),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = ApiConfig::from_env().map_err(|error| Error::from(error.to_string()))?;
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

    let service = TodoService::new(
        DynamoTodoStore::new(
            aws_sdk_dynamodb::Client::new(&aws_config),
            config.table_name.clone(),
            config.index_name.clone(),
        ),
        S3AttachmentStore::new(
            aws_sdk_s3::Client::new(&aws_config),
            config.attachment_bucket.clone(),
            config.signed_url_expiration,
        ),
    );
    let service = &service;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        Ok::<ApiGatewayResponse, Error>(handle_api_event(event.payload, service))
    }))
    .await
}
