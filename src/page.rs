//! Fragment routing and the navigation bar.
//!
//! Every navigation tears down everything under the root and rebuilds it: the
//! navigation bar first, then the view selected by the fragment.

use crate::api_client::DataSource;
use crate::catalog::{mount_landing, CatalogView, FavouritesView};
use crate::dom::{ElementId, Event, Interaction, Listener, RenderTarget, Task};
use crate::foundation::database::Favourites;
use crate::foundation::utils::normalize_fragment;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::debug;

pub const CATALOG_FRAGMENT: &str = "catalog";
pub const FAVOURITES_FRAGMENT: &str = "favourites";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    Catalog,
    Favourites,
}

impl Route {
    pub fn from_fragment(fragment: &str) -> Self {
        match normalize_fragment(fragment) {
            CATALOG_FRAGMENT => Route::Catalog,
            FAVOURITES_FRAGMENT => Route::Favourites,
            _ => Route::Landing,
        }
    }
}

#[derive(Clone)]
pub enum View {
    Landing(ElementId),
    Catalog(Rc<CatalogView>),
    Favourites(Rc<FavouritesView>),
}

pub struct PageController {
    target: RenderTarget,
    source: Rc<dyn DataSource>,
    favourites: Favourites,
    fragment: RefCell<String>,
    view: RefCell<Option<View>>,
    this: Weak<PageController>,
}

impl PageController {
    pub fn new(
        target: RenderTarget,
        source: Rc<dyn DataSource>,
        favourites: Favourites,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            target,
            source,
            favourites,
            fragment: RefCell::new(String::new()),
            view: RefCell::new(None),
            this: this.clone(),
        })
    }

    pub fn fragment(&self) -> String {
        self.fragment.borrow().clone()
    }

    pub fn route(&self) -> Route {
        Route::from_fragment(&self.fragment.borrow())
    }

    pub fn view(&self) -> Option<View> {
        self.view.borrow().clone()
    }

    /// Changes the fragment and re-renders the page.
    pub fn navigate(&self, fragment: &str) -> Option<Task> {
        *self.fragment.borrow_mut() = normalize_fragment(fragment).to_string();
        self.render()
    }

    /// Rebuilds the page for the current fragment.
    ///
    /// Returns the catalog's loading task when the catalog is shown.
    pub fn render(&self) -> Option<Task> {
        let root = self.target.root();
        self.target.remove_children(root);
        self.mount_navigation(root);

        let route = self.route();
        debug!(?route, "rendering page");
        let (view, task) = match route {
            Route::Catalog => {
                let (catalog, task) = CatalogView::mount(
                    &self.target,
                    root,
                    self.source.clone(),
                    self.favourites.clone(),
                );
                (View::Catalog(catalog), Some(task))
            }
            Route::Favourites => {
                let favourites = FavouritesView::mount(&self.target, root, &self.favourites);
                (View::Favourites(Rc::new(favourites)), None)
            }
            Route::Landing => (View::Landing(mount_landing(&self.target, root)), None),
        };

        *self.view.borrow_mut() = Some(view);
        task
    }

    fn mount_navigation(&self, root: ElementId) {
        let nav = self.target.create("div", "nav");
        let catalog_link = self.target.create_with_text("span", "link", "Catalog");
        let favourites_link = self.target.create_with_text("span", "link", "Favourites");
        self.target.append(nav, catalog_link);
        self.target.append(nav, favourites_link);
        self.target.append(root, nav);

        let navigation = Rc::new(Navigation {
            controller: self.this.clone(),
            catalog_link,
            favourites_link,
        });
        self.target.listen(nav, Interaction::Click, navigation);
    }
}

struct Navigation {
    controller: Weak<PageController>,
    catalog_link: ElementId,
    favourites_link: ElementId,
}

impl Listener for Navigation {
    fn handle(self: Rc<Self>, event: &Event) -> Option<Task> {
        let fragment = if event.target == self.catalog_link {
            CATALOG_FRAGMENT
        } else if event.target == self.favourites_link {
            FAVOURITES_FRAGMENT
        } else {
            return None;
        };
        self.controller.upgrade()?.navigate(fragment)
    }
}
