pub mod file_handler;
pub mod share_handler;

pub use file_handler::{
    __path_delete_file, __path_get_share_link, __path_get_upload_progress, __path_list_files,
    __path_upload_file, delete_file, get_share_link, get_upload_progress, list_files, upload_file,
};
pub use share_handler::{
    __path_file_not_available, __path_open_shared_file, file_not_available, open_shared_file,
};
