mod common;

#[cfg(test)]
mod tests {
    use super::*;

    use common::*;
    use ruts_kv::client::ClientError;
    use ruts_kv::store::{RiakStore, RiakStoreOptions, SessionData, SessionStore};
    use ruts_kv::{Error, Id, Inner, Session};
    use std::sync::Arc;

    type TestStore = RiakStore<MockClient>;

    fn create_store() -> Arc<TestStore> {
        let client = Arc::new(MockClient::new());
        Arc::new(RiakStore::new(RiakStoreOptions::new("sessions").client(client)).unwrap())
    }

    fn create_session(store: Arc<TestStore>, id: Option<Id>) -> Session<TestStore> {
        let inner = Inner::new(store, Some(build_cookie_options())).with_id(id);
        Session::new(Arc::new(inner))
    }

    #[tokio::test]
    async fn test_session_basic_operations() {
        let store = create_store();
        let session = create_session(Arc::clone(&store), None);
        let test_data = create_test_session();

        // Test initial state
        let initial_get: Option<TestSession> = session.get("test").await.unwrap();
        assert!(initial_get.is_none());
        assert!(session.id().is_none());

        // Test insert
        session.insert("test", &test_data).await.unwrap();
        let id = session.id().expect("insert should assign an id");

        // Test get after insert
        let retrieved: Option<TestSession> = session.get("test").await.unwrap();
        assert_eq!(retrieved.unwrap(), test_data);

        // The whole record lives under the session id
        let stored: Option<SessionData> = store.get(&id.to_string()).await.unwrap();
        assert!(stored.unwrap().contains_key("test"));

        // Test update
        let mut updated_data = test_data.clone();
        updated_data.user.name = "Updated User".to_string();
        session.insert("test", &updated_data).await.unwrap();

        let retrieved: Option<TestSession> = session.get("test").await.unwrap();
        assert_eq!(retrieved.unwrap(), updated_data);

        // Test delete
        session.delete().await.unwrap();
        assert!(session.id().is_none());

        let stored: Option<SessionData> = store.get(&id.to_string()).await.unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn test_fields_are_kept_together() {
        let store = create_store();
        let session = create_session(store, None);
        let test_data = create_test_session();

        session.insert("user", &test_data.user).await.unwrap();
        session
            .insert("preferences", &test_data.preferences)
            .await
            .unwrap();

        let all = session.get_all().await.unwrap().unwrap();
        assert_eq!(all.len(), 2);

        let user: Option<TestUser> = session.get("user").await.unwrap();
        assert_eq!(user.unwrap(), test_data.user);
    }

    #[tokio::test]
    async fn test_remove_field() {
        let store = create_store();
        let session = create_session(Arc::clone(&store), None);

        session.insert("a", &1).await.unwrap();
        session.insert("b", &2).await.unwrap();
        let id = session.id().unwrap();

        assert!(session.remove("a").await.unwrap());
        assert!(!session.remove("a").await.unwrap());

        let a: Option<i32> = session.get("a").await.unwrap();
        let b: Option<i32> = session.get("b").await.unwrap();
        assert!(a.is_none());
        assert_eq!(b, Some(2));

        // removing the last field destroys the record
        assert!(session.remove("b").await.unwrap());
        let stored: Option<SessionData> = store.get(&id.to_string()).await.unwrap();
        assert!(stored.is_none());
        assert!(session.id().is_none());
    }

    #[tokio::test]
    async fn test_session_regeneration() {
        let store = create_store();
        let session = create_session(Arc::clone(&store), None);
        let test_data = create_test_session();

        // Insert initial data
        session.insert("test", &test_data).await.unwrap();
        let original_id = session.id().unwrap();

        // Regenerate session
        let new_id = session.regenerate().await.unwrap();
        assert!(new_id.is_some());
        assert_ne!(original_id, new_id.unwrap());
        assert_eq!(session.id(), new_id);

        // Verify data persistence
        let retrieved: Option<TestSession> = session.get("test").await.unwrap();
        assert_eq!(retrieved.unwrap(), test_data);

        // The old record is gone
        let stored: Option<SessionData> = store.get(&original_id.to_string()).await.unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn test_existing_id_reads_stored_session() {
        let store = create_store();
        let id = Id::new();
        store
            .set(&id.to_string(), &serde_json::json!({ "cat": true }))
            .await
            .unwrap();

        let session = create_session(store, Some(id));
        let cat: Option<bool> = session.get("cat").await.unwrap();
        assert_eq!(cat, Some(true));
    }

    #[tokio::test]
    async fn test_uninitialized_session() {
        let session = create_session(create_store(), None);

        assert!(matches!(session.delete().await, Err(Error::UnInitialized)));
        assert!(matches!(session.remove("a").await, Err(Error::UnInitialized)));
        assert!(matches!(
            session.regenerate().await,
            Err(Error::UnInitialized)
        ));
        assert!(session.get_all().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_errors_are_surfaced() {
        let store = create_store();
        let session = create_session(Arc::clone(&store), Some(Id::new()));
        store
            .client()
            .fail_next(ClientError::Backend("unavailable".to_string()));

        let err = session.get::<bool>("cat").await.unwrap_err();
        assert!(matches!(err, Error::Store(_)));
        assert_eq!(err.to_string(), "unavailable");
    }
}
