//! Property tests for fixture path matching.
//!
//! Invariants tested:
//! - Query parameter order never changes which file answers
//! - Extra or missing parameters never match
//! - Made-safe names contain no reserved characters

use proptest::prelude::*;
use restclient_core::{Context, HeaderMap, Settings};
use restclient_dao::{Dao, NamedService, Registry};
use restclient_fixture::path::{permutation_candidates, platform_safe};
use std::path::PathBuf;
use tokio::runtime::Runtime;

const PARAMS: [&str; 4] = ["first=a", "second=b", "third=c", "fourth=d"];
const FOUR_PARAM_FILE: &str = "search_fourth_d_third_c_second_b_first_a";

fn names() -> Vec<String> {
    [
        FOUR_PARAM_FILE,
        "search_fourth_d_third_c_second_b_first_a.http-headers",
        "search_first_a_second_b",
        "search_second_b_first_a",
        "search_first_a_second_b.POST",
        "search_first_a_second_a_b_c",
        "found.json",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn url(params: &[&str]) -> String {
    format!("/search?{}", params.join("&"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Property: every ordering of the four parameters selects the same file
    #[test]
    fn parameter_order_is_irrelevant(
        order in Just(PARAMS.to_vec()).prop_shuffle(),
    ) {
        let names = names();
        let url = url(&order);
        prop_assert_eq!(permutation_candidates(&url, &names, false), vec![FOUR_PARAM_FILE]);
        prop_assert_eq!(
            permutation_candidates(&url, &names, true),
            vec!["search_fourth_d_third_c_second_b_first_a.http-headers"]
        );
    }

    /// Property: a subset of the parameters never selects the four-parameter file
    #[test]
    fn subsets_do_not_match_the_full_file(
        order in Just(PARAMS.to_vec()).prop_shuffle(),
        keep in 1usize..4,
    ) {
        let names = names();
        let url = url(&order[..keep]);
        prop_assert!(!permutation_candidates(&url, &names, false).contains(&FOUR_PARAM_FILE));
    }

    /// Property: a DAO answers any ordering with the same body
    #[test]
    fn dispatch_is_order_independent(
        order in Just(PARAMS.to_vec()).prop_shuffle(),
    ) {
        let rt = Runtime::new().unwrap();
        let body = rt.block_on(async {
            let dao = Dao::builder(Resources)
                .registry(Registry::new())
                .settings(Settings::default())
                .build()
                .unwrap();
            dao.get(&Context::new(), &url(&order), HeaderMap::new())
                .await
                .unwrap()
                .text()
                .into_owned()
        });
        prop_assert_eq!(body, "{\"search\": \"four params\"}\n");
    }

    /// Property: made-safe strings contain no reserved characters and are stable
    #[test]
    fn platform_safe_is_idempotent(s in "[ -~]{0,40}") {
        let safe = platform_safe(&s);
        prop_assert!(!safe.contains(['?', '|', '<', '>', '=', ':', '*', ',', ';', '+', '&', '"', '@', '$']));
        prop_assert_eq!(platform_safe(&safe), safe.clone());
        prop_assert_eq!(safe.chars().count(), s.chars().count());
    }
}

struct Resources;

impl restclient_dao::ServiceDefinition for Resources {
    fn service_name(&self) -> &str {
        "testing"
    }

    fn service_mock_paths(&self) -> Vec<PathBuf> {
        vec![PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/resources")]
    }
}

#[test]
fn named_service_has_no_fixtures() {
    let rt = Runtime::new().unwrap();
    let status = rt.block_on(async {
        Dao::builder(NamedService::new("testing"))
            .build()
            .unwrap()
            .get(&Context::new(), &url(&PARAMS), HeaderMap::new())
            .await
            .unwrap()
            .status
    });
    assert_eq!(status, 404);
}
