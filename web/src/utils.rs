use gloo::storage::{LocalStorage, Storage};
use serde::Serialize;
use serde::de::DeserializeOwned;
use yew::prelude::*;

/// Key a value is persisted under in the browser's local storage.
pub(crate) trait StorageKey {
    const KEY: &'static str;
}

pub(crate) trait LocalOrDefault: Sized {
    fn local_or_default() -> Self;
}

impl<T: StorageKey + DeserializeOwned + Default> LocalOrDefault for T {
    fn local_or_default() -> Self {
        LocalStorage::get(T::KEY).unwrap_or_default()
    }
}

pub(crate) trait LocalSave {
    fn local_save(&self);
}

impl<T: StorageKey + Serialize> LocalSave for T {
    fn local_save(&self) {
        if let Err(err) = LocalStorage::set(T::KEY, self) {
            log::error!("Could not save {} to local storage: {:?}", T::KEY, err);
        }
    }
}

/// Whether the browser exposes a usable local storage at all.
pub(crate) fn local_storage_available() -> bool {
    matches!(gloo::utils::window().local_storage(), Ok(Some(_)))
}

#[derive(Properties, PartialEq)]
pub(crate) struct OverlayProps {
    pub class: Classes,
    #[prop_or_default]
    pub children: Html,
}

/// Renders its children as a dialog attached to `document.body`, above the board.
#[function_component]
pub(crate) fn Overlay(props: &OverlayProps) -> Html {
    let content = html! {
        <div class={classes!("overlay", props.class.clone())}>
            <article>{props.children.clone()}</article>
        </div>
    };
    create_portal(content, gloo::utils::body().into())
}

/// Seed for a new deck sequence, taken from `Math.random`.
pub(crate) fn js_random_seed() -> u64 {
    use js_sys::Math::random;

    let half = || (random() * f64::from(u32::MAX)) as u64;
    (half() << 32) | half()
}
