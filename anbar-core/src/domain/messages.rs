//! User-displayable strings
//!
//! Every message that can reach a user (import errors and warnings, status
//! labels, export headers) is rendered here, so callers can show them as-is.

use serde::{Deserialize, Serialize};

/// Language of user-facing text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Fa,
    En,
}

impl Locale {
    /// Parse a locale tag such as `fa`, `fa-IR`, `en` or `en_US`
    pub fn parse(tag: &str) -> Option<Self> {
        let lang = tag.trim().to_lowercase();
        let lang = lang.split(['-', '_']).next().unwrap_or("");
        match lang {
            "fa" | "per" | "fas" => Some(Self::Fa),
            "en" | "eng" => Some(Self::En),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Fa => "fa",
            Locale::En => "en",
        }
    }

    // === Import ===

    pub fn all_duplicates(&self) -> String {
        match self {
            Locale::Fa => "همه داروهای فایل قبلاً موجود هستند".to_string(),
            Locale::En => "All drugs in the file already exist".to_string(),
        }
    }

    pub fn no_drugs_found(&self) -> String {
        match self {
            Locale::Fa => "هیچ دارویی در فایل یافت نشد".to_string(),
            Locale::En => "No drugs were found in the file".to_string(),
        }
    }

    pub fn empty_file(&self) -> String {
        match self {
            Locale::Fa => "فایل خالی است".to_string(),
            Locale::En => "The file is empty".to_string(),
        }
    }

    pub fn file_unreadable(&self, detail: &str) -> String {
        match self {
            Locale::Fa => format!("خطا در پردازش فایل: {detail}"),
            Locale::En => format!("Failed to process file: {detail}"),
        }
    }

    pub fn duplicates_skipped(&self, count: usize) -> String {
        match self {
            Locale::Fa => format!("{count} داروی تکراری نادیده گرفته شد"),
            Locale::En => format!("{count} duplicate drugs were skipped"),
        }
    }

    pub fn imported(&self, count: usize) -> String {
        match self {
            Locale::Fa => format!("{count} دارو با موفقیت اضافه شد"),
            Locale::En => format!("{count} drugs imported successfully"),
        }
    }

    pub fn row_error(&self, row: usize, detail: &str) -> String {
        match self {
            Locale::Fa => format!("خط {row}: {detail}"),
            Locale::En => format!("row {row}: {detail}"),
        }
    }

    pub fn cell_error_value(&self, value: &str) -> String {
        match self {
            Locale::Fa => format!("سلول حاوی مقدار خطا است ({value})"),
            Locale::En => format!("cell contains error value {value}"),
        }
    }

    // === Records ===

    pub fn save_failed(&self) -> String {
        match self {
            Locale::Fa => "خطا در ذخیره اطلاعات داروها".to_string(),
            Locale::En => "Failed to save drug data".to_string(),
        }
    }

    pub fn drug_not_found(&self, key: &str) -> String {
        match self {
            Locale::Fa => format!("دارو یافت نشد: {key}"),
            Locale::En => format!("Drug not found: {key}"),
        }
    }

    pub fn duplicate_code(&self, code: &str) -> String {
        match self {
            Locale::Fa => format!("دارویی با کد {code} قبلاً موجود است"),
            Locale::En => format!("A drug with code {code} already exists"),
        }
    }

    pub fn code_and_name_required(&self) -> String {
        match self {
            Locale::Fa => "کد و نام دارو الزامی است".to_string(),
            Locale::En => "Drug code and name are required".to_string(),
        }
    }

    pub fn invalid_quantity(&self) -> String {
        match self {
            Locale::Fa => "مقدار باید عددی نامنفی باشد".to_string(),
            Locale::En => "Quantity must be a non-negative number".to_string(),
        }
    }

    // === Export ===

    pub fn export_failed(&self, detail: &str) -> String {
        match self {
            Locale::Fa => format!("خطا در ایجاد فایل اکسل: {detail}"),
            Locale::En => format!("Failed to create Excel file: {detail}"),
        }
    }

    pub fn status_matched(&self) -> &'static str {
        match self {
            Locale::Fa => "مطابق",
            Locale::En => "matched",
        }
    }

    pub fn status_surplus(&self, amount: f64) -> String {
        match self {
            Locale::Fa => format!("مازاد {amount}"),
            Locale::En => format!("surplus {amount}"),
        }
    }

    pub fn status_shortage(&self, amount: f64) -> String {
        match self {
            Locale::Fa => format!("کمبود {amount}"),
            Locale::En => format!("shortage {amount}"),
        }
    }

    /// Column titles of the detail sheet
    pub fn detail_headers(&self) -> [&'static str; 8] {
        match self {
            Locale::Fa => [
                "ردیف",
                "کد کالا",
                "نام دارو",
                "موجودی سیستم",
                "شمارش فیزیکی",
                "تفاوت",
                "وضعیت",
                "توضیحات",
            ],
            Locale::En => [
                "Row",
                "Code",
                "Name",
                "System Qty",
                "Physical Qty",
                "Difference",
                "Status",
                "Notes",
            ],
        }
    }

    pub fn detail_sheet_name(&self) -> &'static str {
        match self {
            Locale::Fa => "جزئیات اقلام",
            Locale::En => "Items",
        }
    }

    pub fn summary_sheet_name(&self) -> &'static str {
        match self {
            Locale::Fa => "خلاصه گزارش",
            Locale::En => "Summary",
        }
    }

    pub fn summary_labels(&self) -> SummaryLabels {
        match self {
            Locale::Fa => SummaryLabels {
                title: "گزارش شمارش انبار",
                report_date: "تاریخ گزارش",
                overview: "آمار کلی",
                total: "کل اقلام",
                counted: "شمارش شده",
                matched: "مطابق",
                shortage: "کمبود",
                surplus: "مازاد",
                total_difference: "مجموع تفاوت",
            },
            Locale::En => SummaryLabels {
                title: "Inventory count report",
                report_date: "Report date",
                overview: "Overview",
                total: "Total items",
                counted: "Counted",
                matched: "Matched",
                shortage: "Shortage",
                surplus: "Surplus",
                total_difference: "Total difference",
            },
        }
    }
}

/// Row labels of the summary sheet
#[derive(Debug, Clone, Copy)]
pub struct SummaryLabels {
    pub title: &'static str,
    pub report_date: &'static str,
    pub overview: &'static str,
    pub total: &'static str,
    pub counted: &'static str,
    pub matched: &'static str,
    pub shortage: &'static str,
    pub surplus: &'static str,
    pub total_difference: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locale_tags() {
        assert_eq!(Locale::parse("fa-IR"), Some(Locale::Fa));
        assert_eq!(Locale::parse("EN_us"), Some(Locale::En));
        assert_eq!(Locale::parse("de"), None);
    }

    #[test]
    fn test_status_labels_use_plain_number_formatting() {
        assert_eq!(Locale::En.status_surplus(5.0), "surplus 5");
        assert_eq!(Locale::En.status_shortage(2.5), "shortage 2.5");
        assert_eq!(Locale::Fa.status_matched(), "مطابق");
    }

    #[test]
    fn test_row_error_prefix() {
        assert_eq!(Locale::En.row_error(7, "bad cell"), "row 7: bad cell");
        assert!(Locale::Fa.row_error(7, "x").starts_with("خط 7"));
    }
}
