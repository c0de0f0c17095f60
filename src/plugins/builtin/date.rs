//! Toolbar button inserting the current date and time

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};

use crate::api::{EditorApi, Locale};
use crate::plugins::Plugin;

#[derive(Debug, Default)]
pub struct DatePlugin;

impl DatePlugin {
    pub const ID: &'static str = "plume.DatePlugin";
}

/// Medium date-time style for the locale's language
///
/// `en`: `Jan 5, 2026, 3:04:05 PM`, anything else: `05/01/2026 15:04:05`
pub fn format_date_time(when: &NaiveDateTime, locale: &Locale) -> String {
    match locale.language().as_str() {
        "en" => when.format("%b %-d, %Y, %-I:%M:%S %p").to_string(),
        _ => when.format("%d/%m/%Y %H:%M:%S").to_string(),
    }
}

impl Plugin for DatePlugin {
    fn start(&self, api: Arc<dyn EditorApi>) {
        let handler_api = api.clone();
        api.register_button(
            "Date",
            Arc::new(move || {
                let now = Local::now().naive_local();
                handler_api.insert_text(&format_date_time(&now, &handler_api.locale()));
            }),
        );
    }

    fn name(&self, locale: &Locale) -> String {
        match locale.language().as_str() {
            "fr" => "Date et heure",
            "de" => "Datum und Uhrzeit",
            _ => "Date and time",
        }
        .to_string()
    }
}
