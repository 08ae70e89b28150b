//! Infinite queries and mutations driven against the live mock server.

use std::time::Duration;

use story_schematics_core::bindings::{
    CreateLoglineForm, GetAllLoglinesParams, GetLoglineParams, Lang, LoglinePreview,
};
use story_schematics_core::{ClientConfig, StorySchematicsApi};
use story_schematics_hooks::logline::{CreateLogline, GetAllLoglines, GetLogline};
use story_schematics_hooks::{
    fetch_query, HooksError, InfiniteQuery, InfiniteQueryState, MutationState, MutationStatus, PaginationState,
    RetryPolicy,
};

/// Start the mock server on a random port and return its base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn no_wait() -> RetryPolicy {
    RetryPolicy::default().with_base_delay(Duration::ZERO)
}

/// Store three loglines for `token`, in order.
fn seed(api: &StorySchematicsApi, token: &str) -> Vec<String> {
    let mut create = MutationState::new(CreateLogline::new(api, token));
    let slugs: Vec<String> = ["first", "second", "third"]
        .into_iter()
        .map(String::from)
        .collect();
    for slug in &slugs {
        let form = CreateLoglineForm {
            slug: slug.clone(),
            lang: Lang::En,
            name: slug.to_uppercase(),
            content: format!("The {slug} story."),
        };
        create.mutate(&form).unwrap();
        assert_eq!(create.status(), MutationStatus::Success);
    }
    slugs
}

fn slugs_of<Q: InfiniteQuery<Item = LoglinePreview>>(list: &InfiniteQueryState<Q>) -> Vec<String> {
    list.items().map(|l| l.slug.clone()).collect()
}

#[test]
fn forward_then_backward() {
    let api = StorySchematicsApi::connect(ClientConfig::new(&start_server()).unwrap());
    let slugs = seed(&api, "pager");

    let params = GetAllLoglinesParams {
        limit: Some(1),
        offset: None,
    };
    let mut list =
        InfiniteQueryState::new(GetAllLoglines::new(&api, "pager", params)).with_retry(no_wait());

    assert_eq!(list.fetch_next_page().unwrap().unwrap().len(), 1);
    assert_eq!(list.state(), PaginationState::ExhaustedBackward);
    list.fetch_next_page().unwrap();
    list.fetch_next_page().unwrap();
    assert_eq!(slugs_of(&list), slugs);
    assert_eq!(list.page_params().iter().copied().collect::<Vec<_>>(), vec![0, 1, 2]);

    // Offset 3 returns nothing and closes the list.
    assert_eq!(list.fetch_next_page().unwrap().unwrap().len(), 0);
    assert_eq!(list.state(), PaginationState::Exhausted);
    assert!(list.fetch_next_page().unwrap().is_none());
    assert_eq!(slugs_of(&list), slugs);
}

#[test]
fn bounded_pages_refetch_backwards() {
    let api = StorySchematicsApi::connect(ClientConfig::new(&start_server()).unwrap());
    let slugs = seed(&api, "window");

    let params = GetAllLoglinesParams {
        limit: Some(1),
        offset: None,
    };
    let mut list = InfiniteQueryState::new(GetAllLoglines::new(&api, "window", params))
        .with_retry(no_wait())
        .with_max_pages(2);

    list.fetch_next_page().unwrap();
    list.fetch_next_page().unwrap();
    list.fetch_next_page().unwrap();
    assert_eq!(slugs_of(&list), slugs[1..]);
    assert_eq!(list.state(), PaginationState::Partial);

    // Offset 1 - limit 1 = 0: the evicted first page comes back.
    let page = list.fetch_previous_page().unwrap().unwrap();
    assert_eq!(page[0].slug, "first");
    assert_eq!(slugs_of(&list), slugs[..2]);
    assert!(list.fetch_previous_page().unwrap().is_none());
}

#[test]
fn queries_are_scoped_to_their_token() {
    let api = StorySchematicsApi::connect(ClientConfig::new(&start_server()).unwrap());
    seed(&api, "owner");

    let lookup = GetLoglineParams {
        id: None,
        slug: Some("second".to_string()),
    };
    let found = fetch_query(&GetLogline::new(&api, "owner", lookup.clone()), &no_wait()).unwrap();
    assert_eq!(found.name, "SECOND");

    let err = fetch_query(&GetLogline::new(&api, "stranger", lookup.clone()), &no_wait()).unwrap_err();
    assert!(err.api().unwrap().is_not_found());

    let err = fetch_query(&GetLogline::new(&api, "", lookup), &no_wait()).unwrap_err();
    assert!(matches!(err, HooksError::Disabled { .. }));
}
