//! The reservation cart: completed wizard passes accumulated as parts.

use jiff::tz::TimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blocks::Block;
use crate::service::ReservationMethod;
use crate::slots::{self, Slot};
use crate::state::ReservationState;

/// One completed reservation selection queued for checkout.
///
/// Created exactly once per completed wizard pass and immutable afterwards;
/// the only remaining lifecycle event is removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationPart {
    pub id: Uuid,
    pub service_id: String,
    pub service_name: String,
    /// Pre-rendered display date, shaped by the selection mode.
    pub date: String,
    pub from: i64,
    pub to: i64,
    pub time_text: String,
    #[serde(default)]
    pub is_multi_day: bool,
    pub reservation_method: ReservationMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl ReservationState {
    /// Snapshot the current selection into a new part and reset the wizard
    /// for the next booking pass.
    ///
    /// The selected method is cleared only when the service offers several;
    /// single-method services never re-enter a method step, so their
    /// auto-selected method stays put. Returns `None` (leaving everything
    /// untouched) when no service or method is loaded.
    pub fn add_part(&mut self, slot: &Slot) -> Option<Uuid> {
        let service = self.service.as_ref()?;
        let method = self.selected_method.clone()?;
        let tz = self.tz();

        let part = ReservationPart {
            id: Uuid::new_v4(),
            service_id: service.id.clone(),
            service_name: service.name.resolve(&self.locale).to_string(),
            date: self.part_date_display(slot, &tz),
            from: slot.from,
            to: slot.to,
            time_text: slot.time_text.clone(),
            is_multi_day: self.is_multi_day && (self.end_date.is_some() || slot.is_multi_day),
            reservation_method: method,
            provider_id: self.selected_provider.as_ref().map(|p| p.id.clone()),
            blocks: service.reservation_blocks.clone(),
        };
        let id = part.id;
        let multi_method = service.reservation_methods.len() > 1;

        self.parts.push(part);
        self.reset_date_selection();
        self.current_step = 1;
        if multi_method {
            self.selected_method = None;
        }
        self.determine_steps();
        Some(id)
    }

    /// Drop a queued part by id.
    pub fn remove_part(&mut self, id: Uuid) {
        self.parts.retain(|part| part.id != id);
    }

    fn part_date_display(&self, slot: &Slot, tz: &TimeZone) -> String {
        if self.is_multi_day && slot.is_multi_day {
            let start = slots::day_of(slot.from, tz);
            let end = slots::day_of(slot.to, tz);
            format!("{} – {}", start.strftime("%b %-d"), end.strftime("%b %-d, %Y"))
        } else {
            let date = self
                .selected_date
                .unwrap_or_else(|| slots::day_of(slot.from, tz));
            date.strftime("%a, %b %-d, %Y").to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::LocalizedText;
    use crate::config::WidgetConfig;
    use crate::service::{ReservationConfigs, Service};
    use crate::state::StepKind;

    fn service(methods: &[&str], multi_day: bool) -> Service {
        let mut name = LocalizedText::plain("City Tour");
        name.insert("fr", "Visite de la ville");
        Service {
            id: "svc-1".to_string(),
            name,
            reservation_methods: methods.iter().map(|m| ReservationMethod::new(*m)).collect(),
            reservation_configs: ReservationConfigs { is_multi_day: multi_day },
            durations: Vec::new(),
            reservation_blocks: vec![Block::text("note", "Note")],
            price_option: None,
        }
    }

    fn state(methods: &[&str], multi_day: bool) -> ReservationState {
        let config = WidgetConfig::new("https://api.example.com", "biz-1");
        let mut state = ReservationState::new(&config, "UTC");
        state.set_service(service(methods, multi_day));
        if state.selected_method.is_none() {
            state.select_method(&ReservationMethod::new(methods[0]), false);
        }
        state
    }

    fn day_slot(state: &ReservationState) -> Slot {
        let date: jiff::civil::Date = "2024-06-15".parse().unwrap();
        let from = date
            .at(9, 0, 0, 0)
            .to_zoned(state.tz())
            .unwrap()
            .timestamp()
            .as_second();
        Slot::from_window(from, from + 3_600, &state.tz())
    }

    #[test]
    fn add_part_snapshots_selection() {
        let mut state = state(&["STANDARD"], false);
        state.selected_date = Some("2024-06-15".parse().unwrap());
        let slot = day_slot(&state);

        let id = state.add_part(&slot).expect("part created");
        let part = &state.parts[0];
        assert_eq!(part.id, id);
        assert_eq!(part.service_id, "svc-1");
        assert_eq!(part.service_name, "City Tour");
        assert_eq!(part.date, "Sat, Jun 15, 2024");
        assert_eq!(part.from, slot.from);
        assert_eq!(part.blocks.len(), 1);
        assert!(!part.is_multi_day);
    }

    #[test]
    fn add_part_resets_the_wizard_pass() {
        let mut state = state(&["STANDARD"], false);
        state.selected_date = Some("2024-06-15".parse().unwrap());
        let slot = day_slot(&state);
        state.selected_slot = Some(slot.clone());
        state.current_step = state.step_number(StepKind::Review).unwrap();

        state.add_part(&slot);
        assert_eq!(state.current_step, 1);
        assert_eq!(state.selected_date, None);
        assert_eq!(state.selected_slot, None);
        assert!(state.slots.is_empty());
    }

    #[test]
    fn method_reset_only_for_multi_method_services() {
        let mut state = state(&["STANDARD"], false);
        state.selected_date = Some("2024-06-15".parse().unwrap());
        let slot = day_slot(&state);
        state.add_part(&slot);
        // Single-method services keep their auto-selected method.
        assert!(state.selected_method.is_some());

        let mut state = state_with_choice();
        let slot = day_slot(&state);
        state.selected_date = Some("2024-06-15".parse().unwrap());
        state.add_part(&slot);
        assert_eq!(state.selected_method, None);
    }

    fn state_with_choice() -> ReservationState {
        let mut state = state(&["STANDARD", "ORDER"], false);
        state.select_method(&ReservationMethod::new("STANDARD"), false);
        state
    }

    #[test]
    fn multi_day_part_renders_a_range() {
        let mut state = state(&["STANDARD"], true);
        state.start_date = Some("2024-06-03".parse().unwrap());
        state.end_date = Some("2024-06-07".parse().unwrap());
        state.create_range_slot();
        let slot = state.selected_slot.clone().unwrap();

        state.add_part(&slot);
        let part = &state.parts[0];
        assert!(part.is_multi_day);
        assert_eq!(part.date, "Jun 3 – Jun 7, 2024");
        assert_eq!(part.time_text, "09:00 – 17:00 daily");
    }

    #[test]
    fn add_part_without_service_is_inert() {
        let config = WidgetConfig::new("https://api.example.com", "biz-1");
        let mut state = ReservationState::new(&config, "UTC");
        let slot = Slot::from_window(0, 3_600, &TimeZone::UTC);
        assert_eq!(state.add_part(&slot), None);
        assert!(state.parts.is_empty());
    }

    #[test]
    fn remove_part_filters_by_id() {
        let mut state = state(&["STANDARD"], false);
        state.selected_date = Some("2024-06-15".parse().unwrap());
        let slot = day_slot(&state);
        let first = state.add_part(&slot).unwrap();
        state.selected_method = Some(ReservationMethod::new("STANDARD"));
        state.selected_date = Some("2024-06-15".parse().unwrap());
        let second = state.add_part(&slot).unwrap();

        state.remove_part(first);
        assert_eq!(state.parts.len(), 1);
        assert_eq!(state.parts[0].id, second);
    }

    #[test]
    fn service_name_resolves_cart_locale() {
        let config = WidgetConfig::new("https://api.example.com", "biz-1").with_locale("fr");
        let mut state = ReservationState::new(&config, "UTC");
        state.set_service(service(&["STANDARD"], false));
        state.selected_date = Some("2024-06-15".parse().unwrap());
        let slot = day_slot(&state);

        state.add_part(&slot);
        assert_eq!(state.parts[0].service_name, "Visite de la ville");
    }
}
