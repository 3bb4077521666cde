pub mod csv_loader;
pub mod event_classifier;
pub mod feature_extractor;
pub mod finger_event;
pub mod gesture_state;
pub mod landmark_stream;
pub mod session;
pub mod types;
