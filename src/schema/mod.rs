pub mod phase;
pub mod player;
pub mod route;
pub mod scene;
pub mod story_state;
