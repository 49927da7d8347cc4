use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::gate::RequestGate;
use super::report::{KpiReport, WindowRecords, room_capacity};
use crate::config::types::AnalyticsConfig;
use crate::domain::period::{PeriodKind, PeriodPair, parse_timezone, resolve};
use crate::error::Result;
use crate::ports::record_source::{RecordSource, Scope};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSettings {
    pub basis: Tz,
    pub top_nationalities: usize,
    pub room_count: Option<u32>,
}

impl DashboardSettings {
    pub fn from_config(config: &AnalyticsConfig) -> Result<Self> {
        Ok(Self {
            basis: parse_timezone(&config.timezone)?,
            top_nationalities: config.top_nationalities,
            room_count: config.room_count,
        })
    }
}

/// Computes KPI reports from a record source and keeps the newest one.
pub struct KpiDashboard {
    source: Arc<dyn RecordSource>,
    settings: DashboardSettings,
    gate: RequestGate,
    latest: RwLock<Option<KpiReport>>,
}

impl KpiDashboard {
    pub fn new(source: Arc<dyn RecordSource>, settings: DashboardSettings) -> Self {
        Self {
            source,
            settings,
            gate: RequestGate::new(),
            latest: RwLock::new(None),
        }
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    /// Fetches both windows concurrently and builds the report.
    pub async fn compute(&self, scope: &Scope, periods: PeriodPair) -> Result<KpiReport> {
        let (current_reservations, prior_reservations, current_invoices, prior_invoices) = tokio::try_join!(
            self.source.reservations(scope, &periods.current),
            self.source.reservations(scope, &periods.prior),
            self.source.invoices(scope, &periods.current),
            self.source.invoices(scope, &periods.prior),
        )?;
        let current = WindowRecords {
            reservations: current_reservations,
            invoices: current_invoices,
        };
        let prior = WindowRecords {
            reservations: prior_reservations,
            invoices: prior_invoices,
        };

        let rooms = room_capacity(scope, self.settings.room_count, &[&current, &prior]);
        let report = KpiReport::build(
            scope.clone(),
            periods,
            rooms,
            self.settings.top_nationalities,
            &current,
            &prior,
        );
        if report.skipped_malformed() > 0 {
            tracing::warn!(
                scope = %scope,
                skipped = report.skipped_malformed(),
                "report computed with malformed reservations excluded"
            );
        }
        Ok(report)
    }

    /// Hotel-wide KPIs for the period of `kind` containing `reference`.
    pub async fn executive_kpis(
        &self,
        kind: PeriodKind,
        reference: Option<DateTime<Utc>>,
    ) -> Result<KpiReport> {
        let periods = resolve(kind, reference, self.settings.basis)?;
        self.compute(&Scope::Hotel, periods).await
    }

    pub async fn room_kpis(
        &self,
        room_id: &str,
        kind: PeriodKind,
        reference: Option<DateTime<Utc>>,
    ) -> Result<KpiReport> {
        let periods = resolve(kind, reference, self.settings.basis)?;
        self.compute(&Scope::Room(room_id.to_string()), periods).await
    }

    /// Recomputes and publishes a report unless a newer refresh started
    /// meanwhile, in which case the result is dropped and `None` returned.
    pub async fn refresh(
        &self,
        scope: Scope,
        kind: PeriodKind,
        reference: Option<DateTime<Utc>>,
    ) -> Result<Option<KpiReport>> {
        let ticket = self.gate.issue();
        let periods = resolve(kind, reference, self.settings.basis)?;
        let report = self.compute(&scope, periods).await?;

        let Ok(mut latest) = self.latest.write() else {
            tracing::error!("Dashboard lock poisoned, dropping refreshed report");
            return Ok(None);
        };
        if !self.gate.is_current(ticket) {
            tracing::debug!(scope = %scope, period = %periods.current, "discarding stale report");
            return Ok(None);
        }
        *latest = Some(report.clone());
        tracing::info!(scope = %scope, period = %periods.current, "published dashboard report");
        Ok(Some(report))
    }

    /// The most recently published report.
    pub fn latest(&self) -> Option<KpiReport> {
        self.latest.read().map_or_else(
            |_| {
                tracing::error!("Dashboard lock poisoned on read, returning nothing");
                None
            },
            |guard| guard.clone(),
        )
    }
}
