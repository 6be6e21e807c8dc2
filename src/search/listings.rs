//! Listings page controller.
//!
//! One controller lives for the duration of a listings page request. It
//! applies any pending quick search, loads the full property set once, then
//! answers filter changes synchronously over the loaded set.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::properties::PropertyRecord;
use crate::services::property_store::PropertyStore;

use super::criteria::{CriteriaQuery, FilterCriteria};
use super::filter::filter_properties;
use super::handoff::HandoffChannel;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ListingsState {
    #[default]
    Idle,
    Loading,
    Loaded(Vec<PropertyRecord>),
    LoadFailed,
}

impl ListingsState {
    fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Loaded(_) => "loaded",
            Self::LoadFailed => "load_failed",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Grid => Self::List,
            Self::List => Self::Grid,
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "grid" => Ok(Self::Grid),
            "list" => Ok(Self::List),
            other => Err(format!("unknown view mode '{}'", other)),
        }
    }
}

/// Serializable model of the listings page
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingsPage {
    pub state: &'static str,
    pub criteria: FilterCriteria,
    pub view_mode: ViewMode,
    pub properties: Vec<PropertyRecord>,
    /// Listings loaded before filtering
    pub total: usize,
    /// Listings passing the current criteria
    pub count: usize,
}

#[derive(Debug, Default)]
pub struct ListingsController {
    state: ListingsState,
    criteria: FilterCriteria,
    view_mode: ViewMode,
}

impl ListingsController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_criteria(criteria: FilterCriteria) -> Self {
        Self {
            criteria,
            ..Self::default()
        }
    }

    /// Initializes the page for `session_id`.
    ///
    /// The hand-off slot is consumed before the property fetch starts, so the
    /// first visible set is always computed with the handed-off criteria.
    pub async fn mount(
        store: &dyn PropertyStore,
        handoff: &HandoffChannel,
        session_id: &str,
    ) -> Self {
        let criteria = handoff.initial_criteria(session_id).await;
        let mut controller = Self::with_criteria(criteria);
        controller.load(store).await;
        controller
    }

    /// Mounts the page for a `GET /listings` request.
    ///
    /// Query-string criteria and the view mode are validated first; a rejected
    /// request returns before the hand-off slot is read. Accepted criteria are
    /// overlaid on the handed-off ones field by field.
    pub async fn open(
        store: &dyn PropertyStore,
        handoff: &HandoffChannel,
        session_id: &str,
        query: CriteriaQuery,
        view: Option<&str>,
    ) -> Result<Self, String> {
        let overrides = query.into_criteria()?;
        let view_mode = view
            .filter(|v| !v.trim().is_empty())
            .map(str::parse::<ViewMode>)
            .transpose()?;

        let mut controller = Self::mount(store, handoff, session_id).await;

        if !overrides.is_empty() {
            controller.update_criteria(|criteria| {
                *criteria = std::mem::take(criteria).merged_with(overrides);
            });
        }
        if let Some(mode) = view_mode {
            controller.set_view_mode(mode);
        }

        Ok(controller)
    }

    pub async fn load(&mut self, store: &dyn PropertyStore) {
        self.begin_loading();
        let result = store.list_all().await;
        self.finish_loading(result);
    }

    pub fn begin_loading(&mut self) {
        self.state = ListingsState::Loading;
    }

    pub fn finish_loading(&mut self, result: anyhow::Result<Vec<PropertyRecord>>) {
        self.state = match result {
            Ok(properties) => {
                tracing::debug!(count = properties.len(), "Listings loaded");
                ListingsState::Loaded(properties)
            }
            Err(e) => {
                tracing::error!(error = ?e, "Failed to load listings");
                ListingsState::LoadFailed
            }
        };
    }

    pub fn state(&self) -> &ListingsState {
        &self.state
    }

    /// Loaded listings; empty until loaded and after a failed load
    pub fn properties(&self) -> &[PropertyRecord] {
        match &self.state {
            ListingsState::Loaded(properties) => properties,
            _ => &[],
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
    }

    pub fn update_criteria(&mut self, update: impl FnOnce(&mut FilterCriteria)) {
        update(&mut self.criteria);
    }

    pub fn reset_criteria(&mut self) {
        self.criteria = FilterCriteria::default();
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn toggle_view_mode(&mut self) {
        self.view_mode = self.view_mode.toggled();
    }

    pub fn visible(&self) -> Vec<&PropertyRecord> {
        filter_properties(self.properties(), &self.criteria)
    }

    pub fn snapshot(&self) -> ListingsPage {
        let properties: Vec<PropertyRecord> = self.visible().into_iter().cloned().collect();
        ListingsPage {
            state: self.state.label(),
            criteria: self.criteria.clone(),
            view_mode: self.view_mode,
            total: self.properties().len(),
            count: properties.len(),
            properties,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::properties::{ListingType, PropertyInput};
    use crate::middleware::ensure_session;
    use crate::middleware::session::SESSION_COOKIE;
    use crate::search::criteria::QuickSearch;
    use axum_extra::extract::cookie::{Cookie, CookieJar};
    use crate::search::handoff::MemorySlot;
    use async_trait::async_trait;
    use chrono::Utc;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;
    use uuid::Uuid;

    fn property(title: &str, city: &str, listing_type: ListingType) -> PropertyRecord {
        PropertyRecord {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            price: Some(100_000.0),
            listing_type,
            city: Some(city.to_string()),
            province: None,
            property_type: None,
            rooms: None,
            bathrooms: None,
            square_meters: None,
            energy_class: None,
            features: None,
            is_featured: false,
            images: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Store answering from a fixed list, recording the calls it receives
    struct StaticStore {
        properties: Vec<PropertyRecord>,
        fail: bool,
        calls: Mutex<usize>,
    }

    impl StaticStore {
        fn ok(properties: Vec<PropertyRecord>) -> Self {
            Self {
                properties,
                fail: false,
                calls: Mutex::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                properties: vec![],
                fail: true,
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl PropertyStore for StaticStore {
        async fn list_all(&self) -> anyhow::Result<Vec<PropertyRecord>> {
            *self.calls.lock() += 1;
            if self.fail {
                anyhow::bail!("network unreachable");
            }
            Ok(self.properties.clone())
        }

        async fn get(&self, id: Uuid) -> anyhow::Result<Option<PropertyRecord>> {
            Ok(self.properties.iter().find(|p| p.id == id).cloned())
        }

        async fn insert(&self, _: &PropertyInput) -> anyhow::Result<PropertyRecord> {
            anyhow::bail!("read-only")
        }

        async fn update(&self, _: Uuid, _: &PropertyInput) -> anyhow::Result<Option<PropertyRecord>> {
            anyhow::bail!("read-only")
        }

        async fn delete(&self, _: Uuid) -> anyhow::Result<bool> {
            anyhow::bail!("read-only")
        }
    }

    fn handoff() -> HandoffChannel {
        HandoffChannel::new(Arc::new(MemorySlot::new()), Duration::from_secs(60))
    }

    fn catalogue() -> Vec<PropertyRecord> {
        vec![
            property("Bilocale centro", "Roma", ListingType::Rent),
            property("Villa", "Milano", ListingType::Sale),
            property("Attico", "Roma", ListingType::Sale),
        ]
    }

    #[tokio::test]
    async fn mount_without_handoff_shows_everything() {
        let store = StaticStore::ok(catalogue());
        let controller = ListingsController::mount(&store, &handoff(), "s").await;

        assert!(matches!(controller.state(), ListingsState::Loaded(_)));
        assert!(controller.criteria().is_empty());
        assert_eq!(controller.visible().len(), 3);
        assert_eq!(*store.calls.lock(), 1);
    }

    #[tokio::test]
    async fn mount_applies_handoff_before_first_render() {
        let store = StaticStore::ok(catalogue());
        let channel = handoff();
        let search = QuickSearch {
            listing_type: Some("sale".to_string()),
            location: Some("Roma".to_string()),
            ..QuickSearch::default()
        };
        channel.offer("s", &search).await.unwrap();

        let controller = ListingsController::mount(&store, &channel, "s").await;
        let titles: Vec<_> = controller.visible().iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Attico"]);

        let again = ListingsController::mount(&store, &channel, "s").await;
        assert_eq!(again.visible().len(), 3);
    }

    #[tokio::test]
    async fn load_failure_is_not_fatal() {
        let store = StaticStore::failing();
        let controller = ListingsController::mount(&store, &handoff(), "s").await;

        assert_eq!(controller.state(), &ListingsState::LoadFailed);
        assert!(controller.visible().is_empty());

        let page = controller.snapshot();
        assert_eq!(page.state, "load_failed");
        assert_eq!(page.total, 0);
        assert_eq!(page.count, 0);
    }

    #[tokio::test]
    async fn criteria_changes_recompute_visible_set() {
        let store = StaticStore::ok(catalogue());
        let mut controller = ListingsController::mount(&store, &handoff(), "s").await;

        controller.update_criteria(|c| c.city = Some("roma".to_string()));
        assert_eq!(controller.visible().len(), 2);

        controller.update_criteria(|c| c.listing_type = Some(ListingType::Rent));
        assert_eq!(controller.visible().len(), 1);

        controller.reset_criteria();
        assert_eq!(controller.visible().len(), 3);
        assert_eq!(*store.calls.lock(), 1);
    }

    #[tokio::test]
    async fn view_mode_never_changes_visible_set() {
        let store = StaticStore::ok(catalogue());
        let mut controller = ListingsController::mount(&store, &handoff(), "s").await;
        controller.set_criteria(FilterCriteria {
            city: Some("Milano".to_string()),
            ..FilterCriteria::default()
        });

        let before: Vec<Uuid> = controller.visible().iter().map(|p| p.id).collect();
        controller.toggle_view_mode();
        assert_eq!(controller.view_mode(), ViewMode::List);
        let after: Vec<Uuid> = controller.visible().iter().map(|p| p.id).collect();
        assert_eq!(before, after);

        controller.toggle_view_mode();
        assert_eq!(controller.view_mode(), ViewMode::Grid);
    }

    fn roma_sale() -> QuickSearch {
        QuickSearch {
            listing_type: Some("sale".to_string()),
            location: Some("Roma".to_string()),
            ..QuickSearch::default()
        }
    }

    fn titles(controller: &ListingsController) -> Vec<&str> {
        controller.visible().iter().map(|p| p.title.as_str()).collect()
    }

    #[tokio::test]
    async fn rejected_query_leaves_handoff_pending() {
        let store = StaticStore::ok(catalogue());
        let channel = handoff();
        channel.offer("s", &roma_sale()).await.unwrap();

        let bad_price = CriteriaQuery {
            max_price: Some("cheap".to_string()),
            ..CriteriaQuery::default()
        };
        let err = ListingsController::open(&store, &channel, "s", bad_price, None)
            .await
            .unwrap_err();
        assert!(err.contains("maxPrice"));

        let bad_view =
            ListingsController::open(&store, &channel, "s", CriteriaQuery::default(), Some("table"))
                .await;
        assert!(bad_view.is_err());
        assert_eq!(*store.calls.lock(), 0);

        let controller =
            ListingsController::open(&store, &channel, "s", CriteriaQuery::default(), None)
                .await
                .unwrap();
        assert_eq!(titles(&controller), vec!["Attico"]);
    }

    #[tokio::test]
    async fn query_overrides_handoff_field_by_field() {
        let store = StaticStore::ok(catalogue());
        let channel = handoff();
        channel.offer("s", &roma_sale()).await.unwrap();

        let query = CriteriaQuery {
            listing_type: Some("affitto".to_string()),
            ..CriteriaQuery::default()
        };
        let controller = ListingsController::open(&store, &channel, "s", query, Some("list"))
            .await
            .unwrap();

        assert_eq!(controller.criteria().city.as_deref(), Some("Roma"));
        assert_eq!(controller.criteria().listing_type, Some(ListingType::Rent));
        assert_eq!(controller.view_mode(), ViewMode::List);
        assert_eq!(titles(&controller), vec!["Bilocale centro"]);
    }

    #[tokio::test]
    async fn quick_search_reaches_listings_through_session_cookie() {
        let store = StaticStore::ok(catalogue());
        let channel = handoff();

        // Home page: no cookie yet, one is issued alongside the hand-off
        let (jar, session_id) = ensure_session(CookieJar::new());
        channel.offer(&session_id, &roma_sale()).await.unwrap();
        let issued = jar.get(SESSION_COOKIE).unwrap().value().to_string();

        // Listings page: the browser sends the cookie back
        let returning = CookieJar::new().add(Cookie::new(SESSION_COOKIE, issued));
        let (_, same_session) = ensure_session(returning);
        assert_eq!(same_session, session_id);

        let first =
            ListingsController::open(&store, &channel, &same_session, CriteriaQuery::default(), None)
                .await
                .unwrap();
        assert_eq!(titles(&first), vec!["Attico"]);

        // Another visitor never sees it, and it is gone after one read
        let (_, stranger) = ensure_session(CookieJar::new());
        let other = ListingsController::open(&store, &channel, &stranger, CriteriaQuery::default(), None)
            .await
            .unwrap();
        assert_eq!(other.visible().len(), 3);

        let second =
            ListingsController::open(&store, &channel, &same_session, CriteriaQuery::default(), None)
                .await
                .unwrap();
        assert_eq!(second.visible().len(), 3);
    }

    #[test]
    fn state_transitions() {
        let mut controller = ListingsController::new();
        assert_eq!(controller.state(), &ListingsState::Idle);
        assert!(controller.visible().is_empty());

        controller.begin_loading();
        assert_eq!(controller.state(), &ListingsState::Loading);
        assert_eq!(controller.snapshot().state, "loading");

        controller.finish_loading(Ok(catalogue()));
        let page = controller.snapshot();
        assert_eq!(page.state, "loaded");
        assert_eq!(page.total, 3);
        assert_eq!(page.count, 3);
    }

    #[test]
    fn view_mode_parsing() {
        assert_eq!("LIST".parse::<ViewMode>(), Ok(ViewMode::List));
        assert_eq!(" grid ".parse::<ViewMode>(), Ok(ViewMode::Grid));
        assert!("table".parse::<ViewMode>().is_err());
    }
}
