use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Client-chosen upload ids used for progress polling
    /// - Valid: "upload-1", "a_B_9", "3f9c2e"
    /// - Invalid: "", "has space", "semi;colon", more than 64 characters
    pub static ref UPLOAD_ID_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap();

    /// Payment provider price ids
    /// - Valid: "price_pro", "price_1NXYZabc"
    /// - Invalid: "pro", "price_", "price pro"
    pub static ref PRICE_ID_REGEX: Regex = Regex::new(r"^price_[A-Za-z0-9_]+$").unwrap();
}
