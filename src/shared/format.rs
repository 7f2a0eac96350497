//! Human-readable labels for file sizes and types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Format a byte count as a short label (`1536` -> `"1.5 KB"`)
///
/// Values are rounded to two decimals and trailing zeros are dropped.
/// Anything past terabytes is still expressed in TB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    // floor(log1024(bytes)) in integers, clamped to the largest unit
    let mut exponent = 0;
    let mut remaining = bytes;
    while remaining >= 1024 && exponent < SIZE_UNITS.len() - 1 {
        remaining /= 1024;
        exponent += 1;
    }

    let value = bytes as f64 / 1024_f64.powi(exponent as i32);
    let rounded = (value * 100.0).round() / 100.0;

    format!("{} {}", rounded, SIZE_UNITS[exponent])
}

/// Icon shown next to a file in listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FileIcon {
    Image,
    Video,
    Audio,
    FileText,
    FileArchive,
    File,
}

/// Pick an icon from the MIME type, falling back to the file name for
/// `application/*` types. Extension matching is case-sensitive.
pub fn file_type_icon(content_type: &str, file_name: &str) -> FileIcon {
    let major = content_type.split('/').next().unwrap_or_default();

    match major {
        "image" => FileIcon::Image,
        "video" => FileIcon::Video,
        "audio" => FileIcon::Audio,
        "application" => {
            if file_name.ends_with(".pdf") {
                FileIcon::FileText
            } else if file_name.ends_with(".zip") || file_name.ends_with(".rar") {
                FileIcon::FileArchive
            } else {
                FileIcon::File
            }
        }
        "text" => FileIcon::FileText,
        _ => FileIcon::File,
    }
}

/// Dashboard grouping of files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Images,
    Documents,
    Others,
}

pub fn file_category(content_type: &str) -> FileCategory {
    if content_type.starts_with("image/") {
        FileCategory::Images
    } else if content_type.contains("pdf")
        || content_type.contains("document")
        || content_type.contains("text/")
    {
        FileCategory::Documents
    } else {
        FileCategory::Others
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(1), "1 Bytes");
        assert_eq!(format_file_size(1023), "1023 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1_048_576), "1 MB");
        assert_eq!(format_file_size(1_572_864), "1.5 MB");
        assert_eq!(format_file_size(104_857_600), "100 MB");
        assert_eq!(format_file_size(1_073_741_824), "1 GB");
        assert_eq!(format_file_size(1_099_511_627_776), "1 TB");
    }

    #[test]
    fn test_format_file_size_rounds_to_two_decimals() {
        // 1234 / 1024 = 1.205...
        assert_eq!(format_file_size(1234), "1.21 KB");
    }

    #[test]
    fn test_format_file_size_caps_at_terabytes() {
        assert_eq!(format_file_size(1_125_899_906_842_624), "1024 TB");
    }

    #[test]
    fn test_file_type_icon() {
        assert_eq!(file_type_icon("image/png", "a.png"), FileIcon::Image);
        assert_eq!(file_type_icon("video/mp4", "a.mp4"), FileIcon::Video);
        assert_eq!(file_type_icon("audio/mpeg", "a.mp3"), FileIcon::Audio);
        assert_eq!(file_type_icon("application/pdf", "report.pdf"), FileIcon::FileText);
        assert_eq!(
            file_type_icon("application/zip", "bundle.zip"),
            FileIcon::FileArchive
        );
        assert_eq!(
            file_type_icon("application/x-rar-compressed", "bundle.rar"),
            FileIcon::FileArchive
        );
        assert_eq!(file_type_icon("application/json", "a.json"), FileIcon::File);
        assert_eq!(file_type_icon("text/plain", "notes.txt"), FileIcon::FileText);
        assert_eq!(file_type_icon("", "noext"), FileIcon::File);
        assert_eq!(
            serde_json::to_value(FileIcon::FileArchive).unwrap(),
            "file-archive"
        );
    }

    #[test]
    fn test_file_type_icon_extension_is_case_sensitive() {
        assert_eq!(file_type_icon("application/pdf", "Report.PDF"), FileIcon::File);
        assert_eq!(file_type_icon("application/zip", "BUNDLE.ZIP"), FileIcon::File);
    }

    #[test]
    fn test_file_category() {
        assert_eq!(file_category("image/jpeg"), FileCategory::Images);
        assert_eq!(file_category("application/pdf"), FileCategory::Documents);
        assert_eq!(
            file_category(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            ),
            FileCategory::Documents
        );
        assert_eq!(file_category("text/csv"), FileCategory::Documents);
        assert_eq!(file_category("application/zip"), FileCategory::Others);
        assert_eq!(file_category("video/mp4"), FileCategory::Others);
    }
}
