use crate::catalog::Mounted;
use crate::dom::render::{FAVOURITE_MARK, FAVOURITED, FAVOURITE_CONTROL};
use crate::dom::{ElementId, Event, Interaction, Listener, RenderTarget, Task, HIDDEN};
use crate::foundation::database::{Favourites, Photo};
use std::rc::Rc;
use tracing::{debug, warn};

/// Where the caption is attached while the pointer hovers an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionSlot {
    AfterThumbnail,
    InEnlarged,
}

/// One photo item: thumbnail, enlarged image, hover caption and favourite star.
///
/// Exactly one of the two image variants is visible at a time. The caption is a
/// single element moved between its two slots and detached when not hovered.
pub struct PhotoPresenter {
    photo: Photo,
    target: RenderTarget,
    favourites: Favourites,
    item: ElementId,
    thumbnail: ElementId,
    enlarged_container: ElementId,
    enlarged: ElementId,
    caption: ElementId,
    favourite_control: ElementId,
}

impl PhotoPresenter {
    pub fn mount(target: &RenderTarget, favourites: &Favourites, photo: Photo) -> Rc<Self> {
        let item = target.create("li", "album-item");
        let photo_container = target.create("div", "photo-container");

        let thumbnail = target.create("img", "photo_small");
        target.set_src(thumbnail, &photo.thumbnail_url);

        let enlarged_container = target.create("div", "photo-container_large");
        let enlarged = target.create("img", &format!("photo_large {}", HIDDEN));
        target.set_src(enlarged, &photo.full_url);
        target.append(enlarged_container, enlarged);

        let caption = target.create("div", "title-container");
        let title = target.create_with_text("h4", "title", &format!("Photo: {}", photo.title));
        target.append(caption, title);
        // Detached most of the time, so removing the item must still reach it.
        target.adopt(item, caption);

        let favourite_control = target.create_with_text("div", FAVOURITE_CONTROL, FAVOURITE_MARK);
        match favourites.contains(photo.id) {
            Ok(true) => target.add_class(favourite_control, FAVOURITED),
            Ok(false) => {}
            Err(e) => warn!(photo = photo.id, error = %e, "could not read favourite state"),
        }

        target.append(photo_container, thumbnail);
        target.append(photo_container, enlarged_container);
        target.append(item, photo_container);
        target.append(item, favourite_control);

        let presenter = Rc::new(Self {
            photo,
            target: target.clone(),
            favourites: favourites.clone(),
            item,
            thumbnail,
            enlarged_container,
            enlarged,
            caption,
            favourite_control,
        });
        for interaction in [
            Interaction::Click,
            Interaction::PointerEnter,
            Interaction::PointerLeave,
        ] {
            target.listen(item, interaction, presenter.clone());
        }
        presenter
    }

    pub fn photo(&self) -> &Photo {
        &self.photo
    }

    pub fn thumbnail(&self) -> ElementId {
        self.thumbnail
    }

    pub fn enlarged(&self) -> ElementId {
        self.enlarged
    }

    pub fn enlarged_container(&self) -> ElementId {
        self.enlarged_container
    }

    pub fn caption(&self) -> ElementId {
        self.caption
    }

    pub fn favourite_control(&self) -> ElementId {
        self.favourite_control
    }

    pub fn is_enlarged(&self) -> bool {
        !self.target.has_class(self.enlarged, HIDDEN)
    }

    /// Swaps which image variant is shown.
    pub fn toggle_enlarged(&self) {
        self.target.toggle_class(self.enlarged, HIDDEN);
        self.target.toggle_class(self.thumbnail, HIDDEN);
    }

    pub fn show_caption(&self, slot: CaptionSlot) {
        match slot {
            CaptionSlot::AfterThumbnail => self.target.insert_after(self.thumbnail, self.caption),
            CaptionSlot::InEnlarged => self.target.append(self.enlarged_container, self.caption),
        };
    }

    pub fn hide_caption(&self) {
        self.target.detach(self.caption);
    }

    /// The element currently holding the caption, if it is shown.
    pub fn caption_parent(&self) -> Option<ElementId> {
        self.target.parent(self.caption)
    }

    pub fn is_marked_favourite(&self) -> bool {
        self.target.has_class(self.favourite_control, FAVOURITED)
    }

    /// Flips the star, then stores or forgets the photo accordingly.
    ///
    /// The star always ends up matching the store, also when the store write
    /// fails. Returns whether the photo is favourited afterwards.
    pub fn toggle_favourite(&self) -> bool {
        let marked = self.target.toggle_class(self.favourite_control, FAVOURITED);

        let stored = match self.favourites.toggle(&self.photo) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(photo = self.photo.id, error = %e, "could not update favourites");
                self.favourites.contains(self.photo.id).unwrap_or(!marked)
            }
        };

        if stored != marked {
            debug!(photo = self.photo.id, stored, "favourite star resynced with store");
            if stored {
                self.target.add_class(self.favourite_control, FAVOURITED);
            } else {
                self.target.remove_class(self.favourite_control, FAVOURITED);
            }
        }
        stored
    }

    /// `true` for the enlarged container and anything inside it.
    fn in_enlarged_area(&self, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.enlarged_container {
                return true;
            }
            if node == self.item {
                return false;
            }
            current = self.target.parent(node);
        }
        false
    }
}

impl Mounted for PhotoPresenter {
    fn root(&self) -> ElementId {
        self.item
    }
}

impl Listener for PhotoPresenter {
    fn handle(self: Rc<Self>, event: &Event) -> Option<Task> {
        let target = event.target;
        match event.kind {
            Interaction::Click if target == self.favourite_control => {
                self.toggle_favourite();
            }
            Interaction::Click if target == self.thumbnail => self.toggle_enlarged(),
            Interaction::Click if self.in_enlarged_area(target) => {
                if target == self.enlarged {
                    self.toggle_enlarged();
                }
                self.hide_caption();
            }
            Interaction::PointerEnter if target == self.thumbnail => {
                self.show_caption(CaptionSlot::AfterThumbnail)
            }
            Interaction::PointerEnter if self.in_enlarged_area(target) => {
                self.show_caption(CaptionSlot::InEnlarged)
            }
            Interaction::PointerLeave
                if target == self.thumbnail || self.in_enlarged_area(target) =>
            {
                self.hide_caption()
            }
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::database::KeyValueStore;

    fn beach() -> Photo {
        Photo {
            id: 100,
            title: "Beach".to_string(),
            thumbnail_url: "/thumb.jpg".to_string(),
            full_url: "/full.jpg".to_string(),
        }
    }

    fn setup() -> (RenderTarget, Favourites, sled::Tree) {
        let db = sled::Config::new().temporary(true).open().unwrap();
        let tree = db.open_tree("favourites").unwrap();
        (RenderTarget::new(), Favourites::new(Rc::new(tree.clone())), tree)
    }

    fn mounted(target: &RenderTarget, favourites: &Favourites) -> Rc<PhotoPresenter> {
        let presenter = PhotoPresenter::mount(target, favourites, beach());
        target.append(target.root(), presenter.root());
        presenter
    }

    #[test]
    fn test_display_toggle_has_exactly_two_states() {
        let (target, favourites, _) = setup();
        let presenter = mounted(&target, &favourites);

        assert!(target.is_visible(presenter.thumbnail()));
        assert!(!target.is_visible(presenter.enlarged()));

        target.dispatch(Event::click(presenter.thumbnail()));
        assert!(presenter.is_enlarged());
        assert!(!target.is_visible(presenter.thumbnail()));
        assert!(target.is_visible(presenter.enlarged()));

        target.dispatch(Event::click(presenter.enlarged()));
        assert!(!presenter.is_enlarged());
        assert!(target.is_visible(presenter.thumbnail()));
        assert!(!target.is_visible(presenter.enlarged()));

        for _ in 0..7 {
            presenter.toggle_enlarged();
            assert_ne!(
                target.is_visible(presenter.thumbnail()),
                target.is_visible(presenter.enlarged())
            );
        }
    }

    #[test]
    fn test_caption_is_a_single_moving_element() {
        let (target, favourites, _) = setup();
        let presenter = mounted(&target, &favourites);
        assert_eq!(presenter.caption_parent(), None);

        target.dispatch(Event::new(Interaction::PointerEnter, presenter.thumbnail()));
        let photo_container = target.parent(presenter.thumbnail()).unwrap();
        assert_eq!(presenter.caption_parent(), Some(photo_container));
        assert_eq!(
            target.children(photo_container),
            vec![presenter.thumbnail(), presenter.caption(), presenter.enlarged_container()]
        );

        target.dispatch(Event::new(Interaction::PointerEnter, presenter.enlarged()));
        assert_eq!(presenter.caption_parent(), Some(presenter.enlarged_container()));
        assert_eq!(target.find_by_class("title-container"), vec![presenter.caption()]);
        assert_eq!(
            target.children(photo_container),
            vec![presenter.thumbnail(), presenter.enlarged_container()]
        );
    }

    #[test]
    fn test_caption_detaches_on_leave_and_enlarged_click() {
        let (target, favourites, _) = setup();
        let presenter = mounted(&target, &favourites);

        target.dispatch(Event::new(Interaction::PointerEnter, presenter.thumbnail()));
        target.dispatch(Event::new(Interaction::PointerLeave, presenter.thumbnail()));
        assert_eq!(presenter.caption_parent(), None);

        target.dispatch(Event::click(presenter.thumbnail()));
        target.dispatch(Event::new(Interaction::PointerEnter, presenter.enlarged_container()));
        assert_eq!(presenter.caption_parent(), Some(presenter.enlarged_container()));

        target.dispatch(Event::click(presenter.enlarged()));
        assert_eq!(presenter.caption_parent(), None);
        assert!(!presenter.is_enlarged());
    }

    #[test]
    fn test_favourite_toggle_is_an_involution() {
        let (target, favourites, tree) = setup();
        let presenter = mounted(&target, &favourites);
        assert!(!presenter.is_marked_favourite());

        target.dispatch(Event::click(presenter.favourite_control()));
        assert!(presenter.is_marked_favourite());
        assert_eq!(favourites.get(100).unwrap(), Some(beach()));

        target.dispatch(Event::click(presenter.favourite_control()));
        assert!(!presenter.is_marked_favourite());
        assert!(KeyValueStore::keys(&tree).unwrap().is_empty());
    }

    #[test]
    fn test_initial_star_reflects_store() {
        let (target, favourites, _) = setup();
        favourites.add(&beach()).unwrap();

        let presenter = mounted(&target, &favourites);
        assert!(presenter.is_marked_favourite());

        assert!(!presenter.toggle_favourite());
        assert!(!favourites.contains(100).unwrap());
    }

    #[test]
    fn test_star_resyncs_when_store_changed_elsewhere() {
        let (target, favourites, _) = setup();
        let presenter = mounted(&target, &favourites);

        // another view favourited the same photo after this one was built
        favourites.add(&beach()).unwrap();

        assert!(!presenter.toggle_favourite());
        assert!(!presenter.is_marked_favourite());
        assert!(!favourites.contains(100).unwrap());
    }
}
