//! Query a GraphQL endpoint and dump the resulting cache
//!
//! To run this example:
//! ```sh
//! cd crates/gql-client
//! GRAPHQL_URL=https://cms.example.com/graphql cargo run --example query -- '{ articles { id } }'
//! ```

use gql_client::{Client, FetchPolicy, HttpLink, Operation, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let endpoint = std::env::var("GRAPHQL_URL").ok();
    let query = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "{ __typename }".to_string());

    let client = Client::builder().link(HttpLink::new(endpoint)).build();

    let data = match client.query(&Operation::new(query), FetchPolicy::CacheFirst).await {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("\nSet GRAPHQL_URL to a reachable GraphQL endpoint.");
            return Err(e);
        }
    };

    println!("=== Data ===");
    println!("{}", serde_json::to_string_pretty(&data)?);

    println!("\n=== Cache ===");
    println!("{}", serde_json::to_string_pretty(&client.extract())?);

    Ok(())
}
