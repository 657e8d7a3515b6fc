use crate::route::Route;

#[derive(Debug, PartialEq, Clone)]
pub enum PlayerState {
    Loading,        // Frames are being fetched behind the loading screen
    Revealing,      // Loading screen fading out, then frame layers fading in
    Playing,        // Scroll input drives the frames
    Leaving(Route), // Frame layers fading out before navigating
    Closed,         // Torn down, ignores everything
}
