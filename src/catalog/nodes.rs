use crate::api_client::DataSource;
use crate::catalog::{ChildFetch, ChildRender, ExpandableNode, NodeLayout, PhotoPresenter};
use crate::dom::RenderTarget;
use crate::foundation::database::{Album, AlbumId, Favourites, Photo, User, UserId};
use futures::future::FutureExt;
use std::rc::Rc;

pub type AlbumNode = ExpandableNode<Photo, Rc<PhotoPresenter>>;
pub type UserNode = ExpandableNode<Album, Rc<AlbumNode>>;

const USER_LAYOUT: NodeLayout = NodeLayout {
    tag: "ul",
    class: "users",
    header_tag: "h2",
    container_tag: "div",
    container_class: "spoiler",
};

const ALBUM_LAYOUT: NodeLayout = NodeLayout {
    tag: "ul",
    class: "spoiler album",
    header_tag: "h3",
    container_tag: "ul",
    container_class: "album-container",
};

/// A collapsed user whose albums are fetched on first expansion.
pub fn mount_user_node(
    target: &RenderTarget,
    source: Rc<dyn DataSource>,
    favourites: Favourites,
    user: &User,
) -> Rc<UserNode> {
    let fetch_source = source.clone();
    let fetch: ChildFetch<Album> = Rc::new(move |user_id: UserId| {
        let source = fetch_source.clone();
        async move { source.albums(user_id).await }.boxed_local()
    });

    let child_target = target.clone();
    let render: ChildRender<Album, Rc<AlbumNode>> = Rc::new(move |album: Album| {
        mount_album_node(&child_target, source.clone(), favourites.clone(), &album)
    });

    ExpandableNode::mount(
        target,
        user.id,
        &USER_LAYOUT,
        &format!("User: {}", user.name),
        fetch,
        render,
    )
}

/// A collapsed album whose photos are fetched on first expansion.
pub fn mount_album_node(
    target: &RenderTarget,
    source: Rc<dyn DataSource>,
    favourites: Favourites,
    album: &Album,
) -> Rc<AlbumNode> {
    let fetch: ChildFetch<Photo> = Rc::new(move |album_id: AlbumId| {
        let source = source.clone();
        async move { source.photos(album_id).await }.boxed_local()
    });

    let child_target = target.clone();
    let render: ChildRender<Photo, Rc<PhotoPresenter>> =
        Rc::new(move |photo: Photo| PhotoPresenter::mount(&child_target, &favourites, photo));

    ExpandableNode::mount(
        target,
        album.id,
        &ALBUM_LAYOUT,
        &format!("Album: {}", album.title),
        fetch,
        render,
    )
}
