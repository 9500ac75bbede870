pub mod pane_chrome;
pub mod popup;
pub mod scrollable_list;
pub mod status_bar;
pub mod toast;
