//! Display settings holder.
//!
//! Values are stored as given; `overlay_opacity` is not clamped here.

use crate::model::settings::{DisplaySettings, MapStyle};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsStore {
    display_settings: DisplaySettings,
}

impl SettingsStore {
    pub fn new(display_settings: DisplaySettings) -> Self {
        Self { display_settings }
    }

    pub fn display_settings(&self) -> &DisplaySettings {
        &self.display_settings
    }

    pub fn set_overlay_opacity(&mut self, opacity: f64) {
        self.display_settings.overlay_opacity = opacity;
    }

    pub fn set_map_style(&mut self, style: MapStyle) {
        self.display_settings.map_style = style;
    }

    pub fn replace(&mut self, settings: DisplaySettings) {
        self.display_settings = settings;
    }
}

#[cfg(test)]
mod tests {
    use super::SettingsStore;
    use crate::model::settings::{DisplaySettings, MapStyle};

    #[test]
    fn out_of_range_opacity_is_stored_as_is() {
        let mut store = SettingsStore::default();
        store.set_overlay_opacity(1.75);
        assert_eq!(store.display_settings().overlay_opacity, 1.75);
        store.set_overlay_opacity(-0.5);
        assert_eq!(store.display_settings().overlay_opacity, -0.5);
    }

    #[test]
    fn field_setters_leave_other_fields_untouched() {
        let mut store = SettingsStore::new(DisplaySettings {
            overlay_opacity: 0.3,
            map_style: MapStyle::Standard,
        });
        store.set_map_style(MapStyle::Imagery);
        assert_eq!(
            *store.display_settings(),
            DisplaySettings {
                overlay_opacity: 0.3,
                map_style: MapStyle::Imagery,
            }
        );
    }
}
