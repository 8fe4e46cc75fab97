use crate::api_client::DataSource;
use crate::catalog::{mount_user_node, Mounted, PhotoPresenter, UserNode};
use crate::dom::{ElementId, RenderTarget, Task};
use crate::foundation::database::Favourites;
use futures::future::FutureExt;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// The user list, one collapsed node per named user.
pub struct CatalogView {
    target: RenderTarget,
    container: ElementId,
    source: Rc<dyn DataSource>,
    favourites: Favourites,
    users: RefCell<Vec<Rc<UserNode>>>,
}

impl CatalogView {
    /// Appends the (still empty) catalog to `parent`.
    ///
    /// The returned task fetches the users and fills the catalog. If the catalog
    /// has been removed by the time the users arrive, nothing is rendered.
    pub fn mount(
        target: &RenderTarget,
        parent: ElementId,
        source: Rc<dyn DataSource>,
        favourites: Favourites,
    ) -> (Rc<Self>, Task) {
        let container = target.create("div", "catalog");
        target.append(parent, container);

        let view = Rc::new(Self {
            target: target.clone(),
            container,
            source,
            favourites,
            users: RefCell::new(Vec::new()),
        });
        let task = view.clone().load_users().boxed_local();
        (view, task)
    }

    pub fn users(&self) -> Vec<Rc<UserNode>> {
        self.users.borrow().clone()
    }

    async fn load_users(self: Rc<Self>) {
        let users = match self.source.users().await {
            Ok(users) => users,
            Err(e) => {
                warn!(error = %e, "failed to fetch users, catalog stays empty");
                Vec::new()
            }
        };

        if !self.target.exists(self.container) {
            debug!("catalog was replaced before the users arrived");
            return;
        }

        let nodes: Vec<Rc<UserNode>> = users
            .iter()
            .filter(|user| !user.name.is_empty())
            .map(|user| {
                mount_user_node(&self.target, self.source.clone(), self.favourites.clone(), user)
            })
            .collect();
        for node in &nodes {
            self.target.append(self.container, node.root());
        }
        *self.users.borrow_mut() = nodes;
    }
}

impl Mounted for CatalogView {
    fn root(&self) -> ElementId {
        self.container
    }
}

/// Every stored favourite, rendered without contacting the API.
pub struct FavouritesView {
    container: ElementId,
    photos: Vec<Rc<PhotoPresenter>>,
}

impl FavouritesView {
    pub fn mount(target: &RenderTarget, parent: ElementId, favourites: &Favourites) -> Self {
        let container = target.create("div", "favourites");
        target.append(parent, container);

        let stored = favourites.list().unwrap_or_else(|e| {
            warn!(error = %e, "could not read favourites");
            Vec::new()
        });

        let photos: Vec<Rc<PhotoPresenter>> = stored
            .into_iter()
            .map(|photo| PhotoPresenter::mount(target, favourites, photo))
            .collect();
        for photo in &photos {
            target.append(container, photo.root());
        }

        Self { container, photos }
    }

    pub fn photos(&self) -> &[Rc<PhotoPresenter>] {
        &self.photos
    }
}

impl Mounted for FavouritesView {
    fn root(&self) -> ElementId {
        self.container
    }
}

/// The static block shown for unknown routes.
pub fn mount_landing(target: &RenderTarget, parent: ElementId) -> ElementId {
    let landing = target.create_with_text("div", "main-page", "Home page");
    target.append(parent, landing);
    landing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::{FetchError, MockDataSource};
    use crate::foundation::database::{Photo, User};

    fn favourites() -> Favourites {
        let db = sled::Config::new().temporary(true).open().unwrap();
        Favourites::new(Rc::new(db.open_tree("favourites").unwrap()))
    }

    fn user(id: u64, name: &str) -> User {
        User {
            id,
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_catalog_lists_named_users_in_order() {
        let mut source = MockDataSource::new();
        source.expect_users().times(1).returning(|| {
            Ok(vec![user(3, "Cid"), user(1, ""), user(2, "Ann"), user(4, "Bob")])
        });

        let target = RenderTarget::new();
        let (view, task) =
            CatalogView::mount(&target, target.root(), Rc::new(source), favourites());
        assert!(view.users().is_empty());
        task.await;

        let ids: Vec<u64> = view.users().iter().map(|node| node.id()).collect();
        assert_eq!(ids, vec![3, 2, 4]);
        assert_eq!(target.find_by_class("users").len(), 3);
        assert!(target.find_by_class("album").is_empty());
    }

    #[tokio::test]
    async fn test_catalog_fetch_failure_renders_nothing() {
        let mut source = MockDataSource::new();
        source
            .expect_users()
            .returning(|| Err(FetchError::Other("offline".to_string())));

        let target = RenderTarget::new();
        let (view, task) =
            CatalogView::mount(&target, target.root(), Rc::new(source), favourites());
        task.await;

        assert!(view.users().is_empty());
        assert!(target.children(view.root()).is_empty());
    }

    #[tokio::test]
    async fn test_catalog_replaced_before_load_stays_empty() {
        let mut source = MockDataSource::new();
        source.expect_users().returning(|| Ok(vec![user(1, "Ann")]));

        let target = RenderTarget::new();
        let (view, task) =
            CatalogView::mount(&target, target.root(), Rc::new(source), favourites());
        target.remove_children(target.root());
        let landing = mount_landing(&target, target.root());
        task.await;

        assert!(view.users().is_empty());
        assert_eq!(target.children(target.root()), vec![landing]);
    }

    #[test]
    fn test_favourites_view_renders_every_record() {
        let favourites = favourites();
        for id in [5, 2] {
            favourites
                .add(&Photo {
                    id,
                    title: format!("Photo {id}"),
                    thumbnail_url: format!("/t{id}.jpg"),
                    full_url: format!("/f{id}.jpg"),
                })
                .unwrap();
        }

        let target = RenderTarget::new();
        let view = FavouritesView::mount(&target, target.root(), &favourites);

        let ids: Vec<u64> = view.photos().iter().map(|p| p.photo().id).collect();
        assert_eq!(ids, vec![2, 5]);
        assert!(view.photos().iter().all(|p| p.is_marked_favourite()));
        assert_eq!(target.children(view.root()).len(), 2);
    }
}
