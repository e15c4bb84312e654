use std::path::PathBuf;
use time::{Duration, OffsetDateTime};

use crate::data::TokenPair;
use crate::lib_constants::{
    ACCESS_TOKEN_FILE,
    REFRESH_TOKEN_FILE,
    TOKEN_EXPIRES_FILE,
};
use crate::token_store::TokenStore;
use crate::token_store::internal::{ProductionTokenStore, TokenStoreImpl};
use crate::token_store::internal::tests::mocks::TestTokenStoreIo;


const STATE_DIR: &str = "/state/fleetlink";

fn pair(expires_at: OffsetDateTime) -> TokenPair {
    TokenPair {
        access_token: "access-abc".to_string(),
        refresh_token: "refresh-def".to_string(),
        expires_at,
    }
}

fn store_with_io(io: TestTokenStoreIo) -> TokenStoreImpl<TestTokenStoreIo> {
    TokenStoreImpl::new_impl(io, PathBuf::from(STATE_DIR))
}

fn key(name: &str) -> PathBuf {
    PathBuf::from(STATE_DIR).join(name)
}

#[tokio::test]
async fn load_returns_none_when_nothing_is_stored() {
    let store = store_with_io(TestTokenStoreIo::empty());
    assert_eq!(store.load().await.unwrap(), None);
}

#[tokio::test]
async fn store_then_load_round_trips_the_pair() {
    let expires_at =
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
            + Duration::milliseconds(250);
    let store = store_with_io(TestTokenStoreIo::empty());
    store.store(&pair(expires_at)).await.unwrap();
    assert_eq!(store.load().await.unwrap(), Some(pair(expires_at)));
}

#[tokio::test]
async fn store_writes_all_three_keys_with_millisecond_expiry() {
    let expires_at =
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
    let store = store_with_io(TestTokenStoreIo::empty());
    store.store(&pair(expires_at)).await.unwrap();

    let files = store.io.files();
    assert_eq!(
        files.get(&key(ACCESS_TOKEN_FILE)).map(String::as_str),
        Some("access-abc"),
    );
    assert_eq!(
        files.get(&key(REFRESH_TOKEN_FILE)).map(String::as_str),
        Some("refresh-def"),
    );
    assert_eq!(
        files.get(&key(TOKEN_EXPIRES_FILE)).map(String::as_str),
        Some("1700000000000"),
    );
}

#[tokio::test]
async fn partial_keys_read_back_as_no_session() {
    let io = TestTokenStoreIo::empty();
    io.insert(key(ACCESS_TOKEN_FILE), "access-abc");
    let store = store_with_io(io);
    assert_eq!(store.load().await.unwrap(), None);
}

#[tokio::test]
async fn corrupt_expiry_reads_back_as_no_session() {
    let io = TestTokenStoreIo::empty();
    io.insert(key(ACCESS_TOKEN_FILE), "access-abc");
    io.insert(key(REFRESH_TOKEN_FILE), "refresh-def");
    io.insert(key(TOKEN_EXPIRES_FILE), "not-a-number");
    let store = store_with_io(io);
    assert_eq!(store.load().await.unwrap(), None);
}

#[tokio::test]
async fn clear_removes_every_key() {
    let expires_at =
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
    let store = store_with_io(TestTokenStoreIo::empty());
    store.store(&pair(expires_at)).await.unwrap();
    store.clear().await.unwrap();
    assert!(store.io.files().is_empty());
    assert_eq!(store.load().await.unwrap(), None);
}

#[tokio::test]
async fn clear_on_an_empty_store_succeeds() {
    let store = store_with_io(TestTokenStoreIo::empty());
    store.clear().await.unwrap();
}

#[tokio::test]
async fn production_io_round_trips_through_the_filesystem() {
    let dir = assert_fs::TempDir::new().unwrap();
    let state_directory = dir.path().join("fleetlink");
    let expires_at =
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
    let store = ProductionTokenStore::new(&state_directory);

    assert_eq!(store.load().await.unwrap(), None);
    store.store(&pair(expires_at)).await.unwrap();
    assert!(state_directory.join(ACCESS_TOKEN_FILE).is_file());
    assert!(state_directory.join(REFRESH_TOKEN_FILE).is_file());
    assert!(state_directory.join(TOKEN_EXPIRES_FILE).is_file());
    assert_eq!(store.load().await.unwrap(), Some(pair(expires_at)));

    store.clear().await.unwrap();
    assert!(!state_directory.join(ACCESS_TOKEN_FILE).exists());
    assert_eq!(store.load().await.unwrap(), None);
}
