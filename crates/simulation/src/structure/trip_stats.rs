use serde::{Deserialize, Serialize};

use crate::config::PERCENT_UNSET;

/// Passenger and mail counters for the current and the previous year.
///
/// Residential structures keep success percentages in the last-year
/// fields; every other structure keeps the absolute succeeded counts there.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode,
)]
pub struct TripStats {
    pub passengers_generated_commuting: u16,
    pub passengers_succeeded_commuting: u16,
    pub passenger_success_percent_last_year_commuting: u16,
    pub passengers_generated_visiting: u16,
    pub passengers_succeeded_visiting: u16,
    pub passenger_success_percent_last_year_visiting: u16,
    pub mail_generated: u16,
    pub mail_delivery_succeeded: u16,
    pub mail_delivery_succeeded_last_year: u16,
    pub mail_delivery_success_percent_last_year: u16,
}

impl Default for TripStats {
    fn default() -> Self {
        Self {
            passengers_generated_commuting: 0,
            passengers_succeeded_commuting: 0,
            passenger_success_percent_last_year_commuting: PERCENT_UNSET,
            passengers_generated_visiting: 0,
            passengers_succeeded_visiting: 0,
            passenger_success_percent_last_year_visiting: PERCENT_UNSET,
            mail_generated: 0,
            mail_delivery_succeeded: 0,
            mail_delivery_succeeded_last_year: PERCENT_UNSET,
            mail_delivery_success_percent_last_year: PERCENT_UNSET,
        }
    }
}

fn percent(succeeded: u16, generated: u16) -> u16 {
    if generated == 0 {
        PERCENT_UNSET
    } else {
        (u32::from(succeeded) * 100 / u32::from(generated)).min(u32::from(u16::MAX)) as u16
    }
}

impl TripStats {
    pub fn add_generated_commuting(&mut self, n: u16) {
        self.passengers_generated_commuting = self.passengers_generated_commuting.saturating_add(n);
    }

    pub fn add_succeeded_commuting(&mut self, n: u16) {
        self.passengers_succeeded_commuting = self.passengers_succeeded_commuting.saturating_add(n);
    }

    pub fn add_generated_visiting(&mut self, n: u16) {
        self.passengers_generated_visiting = self.passengers_generated_visiting.saturating_add(n);
    }

    pub fn add_succeeded_visiting(&mut self, n: u16) {
        self.passengers_succeeded_visiting = self.passengers_succeeded_visiting.saturating_add(n);
    }

    pub fn add_mail_generated(&mut self, n: u16) {
        self.mail_generated = self.mail_generated.saturating_add(n);
    }

    pub fn add_mail_delivered(&mut self, n: u16) {
        self.mail_delivery_succeeded = self.mail_delivery_succeeded.saturating_add(n);
    }

    pub fn commuting_percent_this_year(&self) -> u16 {
        percent(
            self.passengers_succeeded_commuting,
            self.passengers_generated_commuting,
        )
    }

    pub fn visiting_percent_this_year(&self) -> u16 {
        percent(
            self.passengers_succeeded_visiting,
            self.passengers_generated_visiting,
        )
    }

    pub fn mail_percent_this_year(&self) -> u16 {
        percent(self.mail_delivery_succeeded, self.mail_generated)
    }

    /// Snapshot this year into the last-year fields and zero the counters.
    pub fn roll_over(&mut self, residential: bool) {
        if residential {
            self.passenger_success_percent_last_year_commuting = self.commuting_percent_this_year();
            self.passenger_success_percent_last_year_visiting = self.visiting_percent_this_year();
        } else {
            self.passenger_success_percent_last_year_commuting = self.passengers_succeeded_commuting;
            self.passenger_success_percent_last_year_visiting = self.passengers_succeeded_visiting;
        }
        self.mail_delivery_succeeded_last_year = self.mail_delivery_succeeded;
        self.mail_delivery_success_percent_last_year = self.mail_percent_this_year();

        self.passengers_generated_commuting = 0;
        self.passengers_succeeded_commuting = 0;
        self.passengers_generated_visiting = 0;
        self.passengers_succeeded_visiting = 0;
        self.mail_generated = 0;
        self.mail_delivery_succeeded = 0;
    }
}
