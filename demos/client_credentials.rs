//! Demonstrates sourcing client credentials from a secret store and calling a mock API with the
//! default reqwest transport, reusing the cached token across calls.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use oauth2_api_client::{
	ApiClient, ClientConfig,
	secrets::{ClientCredentials, MemorySecretStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/tenant-acme/oauth2/v2.0/token")
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let api_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/orders").header("authorization", "Bearer demo-access");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "orders": [{ "id": 1 }, { "id": 2 }] }));
		})
		.await;
	let store = MemorySecretStore::from_iter([(
		"demo/credentials",
		json!({ "clientId": "demo-client", "clientSecret": "super-secret" }),
	)]);
	let credentials = ClientCredentials::load(&store, "demo/credentials").await?;
	let config = ClientConfig::builder()
		.api_endpoint(server.url("/v1"))
		.authority(server.base_url())
		.tenant_id("tenant-acme")
		.credentials(credentials)
		.scope("api://orders/.default")
		.retries(2)
		.build()?;
	let client = ApiClient::new(config)?;
	let first = client.get("/orders").await?;
	let second = client.get("orders").await?;

	println!("First page: {first}.");
	println!("Second page (cached token): {second}.");

	token_mock.assert_calls_async(1).await;
	api_mock.assert_calls_async(2).await;

	Ok(())
}
