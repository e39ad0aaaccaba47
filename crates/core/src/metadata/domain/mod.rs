pub mod face_object;
pub mod machine_readable_code_object;
pub mod metadata_error;
pub mod metadata_object;
pub mod metadata_object_builder;
pub mod object_type;
pub mod payload_decoder;
