//! Property-Based Tests for Permalink Resolution
//!
//! For any consistent correspondence table, every legacy post and topic in it
//! resolves to its new location, every legacy user outside it is Not Found,
//! and every redirect carries the original request URL as provenance.

use std::collections::HashSet;
use std::sync::Arc;

use axum::http::StatusCode;
use fluxredir_test_utils::generators::*;
use fluxredir_test_utils::InMemoryMappingStore;
use proptest::prelude::*;
use tokio::runtime::Runtime;

#[path = "support/router.rs"]
mod router_support;
use router_support::{get, location, split_provenance, test_app};

fn test_runtime() -> Result<Runtime, TestCaseError> {
    Runtime::new().map_err(|e| TestCaseError::fail(format!("Failed to create runtime: {}", e)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_every_mapped_post_resolves(posts in arb_post_table()) {
        let rt = test_runtime()?;
        let app = test_app(Arc::new(InMemoryMappingStore::new(&[], &posts)));

        rt.block_on(async {
            for post in &posts {
                let uri = format!("/viewtopic.php?pid={}", post.legacy_post_id);
                let response = get(app.clone(), &uri).await;
                prop_assert_eq!(response.status(), StatusCode::FOUND);

                let (destination, _) = split_provenance(&location(&response));
                prop_assert_eq!(
                    destination,
                    format!(
                        "https://forum.example.org/t/topic/{}/{}",
                        post.new_topic_id, post.new_topic_post_number
                    )
                );
            }
            Ok(())
        })?;
    }

    #[test]
    fn prop_every_mapped_topic_resolves(posts in arb_post_table()) {
        let rt = test_runtime()?;
        let app = test_app(Arc::new(InMemoryMappingStore::new(&[], &posts)));

        rt.block_on(async {
            for post in &posts {
                let uri = format!("/viewtopic.php?id={}", post.legacy_topic_id);
                let response = get(app.clone(), &uri).await;
                prop_assert_eq!(response.status(), StatusCode::FOUND);

                let (destination, _) = split_provenance(&location(&response));
                prop_assert_eq!(
                    destination,
                    format!("https://forum.example.org/t/topic/{}", post.new_topic_id)
                );
            }
            Ok(())
        })?;
    }

    #[test]
    fn prop_unmapped_user_is_not_found(users in arb_user_table(), probe in arb_legacy_id()) {
        let known: HashSet<_> = users.iter().map(|u| u.legacy_user_id).collect();
        prop_assume!(!known.contains(&probe));

        let rt = test_runtime()?;
        let app = test_app(Arc::new(InMemoryMappingStore::new(&users, &[])));

        rt.block_on(async {
            let response = get(app, &format!("/profile.php?id={}", probe)).await;
            prop_assert_eq!(response.status(), StatusCode::NOT_FOUND);
            Ok(())
        })?;
    }

    #[test]
    fn prop_provenance_is_original_url(
        segments in proptest::collection::vec("[a-z0-9_-]{1,10}", 1..4),
        query in proptest::option::of("[a-z]{1,5}=[a-z0-9]{0,5}"),
    ) {
        let path = format!("/legacy/{}", segments.join("/"));
        let uri = match &query {
            Some(q) => format!("{}?{}", path, q),
            None => path.clone(),
        };

        let rt = test_runtime()?;
        let app = test_app(Arc::new(InMemoryMappingStore::default()));

        rt.block_on(async {
            let response = get(app, &uri).await;
            prop_assert_eq!(response.status(), StatusCode::FOUND);

            let (destination, provenance) = split_provenance(&location(&response));
            let expected_original = format!("https://old.example.org{}", uri);
            prop_assert_eq!(provenance, Some(expected_original));
            prop_assert_eq!(destination, format!("https://forum.example.org{}", uri));
            Ok(())
        })?;
    }
}
