//! Print the endpoint catalog without making any request.
//!
//! Run:
//! `cargo run --example blocking_list_endpoints`

use devto_client::BlockingDevClient;

fn main() {
    for endpoint in BlockingDevClient::endpoints() {
        println!(
            "{} {} {}",
            endpoint.method, endpoint.path_template, endpoint.name
        );
    }
}
