//! In-process provider stubs for adapter tests

use axum::Router;
use bridge_types::{normalize_address, QuoteRequest, TokenListData};
use std::collections::BTreeMap;

/// Serve `router` on an ephemeral local port and return its base URL
pub async fn serve(router: Router) -> String {
	let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	tokio::spawn(async move {
		axum::serve(listener, router).await.unwrap();
	});
	format!("http://{}", addr)
}

/// Chain token list containing exactly the request's two tokens
pub fn tokens_for(request: &QuoteRequest) -> TokenListData {
	let mut map: BTreeMap<u64, Vec<String>> = BTreeMap::new();
	map.entry(request.src_chain_id)
		.or_default()
		.push(normalize_address(&request.input_token.address));
	map.entry(request.dst_chain_id)
		.or_default()
		.push(normalize_address(&request.output_token.address));
	TokenListData::ChainTokens(map)
}
