// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::path::PathBuf;
use std::rc::Rc;
use tabula_core::{
    Accessor, BulkActionHandler, CellValue, ColumnDefinition, ColumnType, InputSpec,
    ListenerRegistry, RowId, RowValues, TableRow, TrackingRegistry,
};
use time::macros::{date, datetime};
use time::{Date, Duration, OffsetDateTime};

const COMPANY_PREFIXES: [&str; 14] = [
    "Acme",
    "Northwind",
    "Globex",
    "Initech",
    "Umbrella",
    "Stark",
    "Wayne",
    "Hooli",
    "Vandelay",
    "Soylent",
    "Cyberdyne",
    "Tyrell",
    "Massive",
    "Gringotts",
];
const COMPANY_SUFFIXES: [&str; 7] = [
    "Labs",
    "Industries",
    "Logistics",
    "Health",
    "Analytics",
    "Foods",
    "Systems",
];

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 12] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Turner", "Brooks",
];

pub const STAGES: [&str; 6] = [
    "Prospecting",
    "Qualification",
    "Proposal",
    "Negotiation",
    "Closed Won",
    "Closed Lost",
];
pub const REGIONS: [&str; 4] = ["North America", "EMEA", "APAC", "LATAM"];
pub const PLANS: [&str; 4] = ["Starter", "Team", "Business", "Enterprise"];

const REFERENCE_DAY: Date = date!(2026 - 01 - 01);
const REFERENCE_NOW: OffsetDateTime = datetime!(2026-01-01 09:00 UTC);

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = (max - min + 1) as u64;
        min + (self.next_u64() % span) as i64
    }

    fn chance(&mut self, percent: u64) -> bool {
        self.next_u64() % 100 < percent
    }
}

/// A sales pipeline row.
#[derive(Debug, Clone, PartialEq)]
pub struct Opportunity {
    pub id: i64,
    pub account: String,
    pub owner: String,
    pub owner_email: String,
    pub stage: String,
    pub region: String,
    pub amount_cents: Option<i64>,
    pub probability: f64,
    pub close_date: Option<Date>,
    pub last_activity: OffsetDateTime,
    pub website: String,
    pub phone: String,
    pub priority: u8,
    pub strategic: bool,
}

impl RowValues for Opportunity {
    fn value(&self, key: &str) -> CellValue {
        match key {
            "account" => CellValue::text(&self.account),
            "owner" => CellValue::text(&self.owner),
            "owner.email" => CellValue::text(&self.owner_email),
            "stage" => CellValue::text(&self.stage),
            "region" => CellValue::text(&self.region),
            "amount" => self.amount_cents.map_or(CellValue::Null, CellValue::Cents),
            "probability" => CellValue::Number(self.probability),
            "close_date" => self.close_date.map_or(CellValue::Null, CellValue::Date),
            "last_activity" => CellValue::DateTime(self.last_activity),
            "website" => CellValue::text(&self.website),
            "phone" => CellValue::text(&self.phone),
            "priority" => CellValue::Number(f64::from(self.priority)),
            "strategic" => CellValue::Bool(self.strategic),
            _ => CellValue::Null,
        }
    }
}

impl TableRow for Opportunity {
    fn row_id(&self) -> RowId {
        RowId::new(self.id)
    }

    fn apply_edit(&mut self, key: &str, value: &CellValue) -> bool {
        match (key, value) {
            ("account", CellValue::Text(text)) => self.account = text.clone(),
            ("stage", CellValue::Text(text)) => self.stage = text.clone(),
            ("amount", CellValue::Cents(cents)) => self.amount_cents = Some(*cents),
            ("amount", CellValue::Null) => self.amount_cents = None,
            ("probability", CellValue::Number(number)) => self.probability = *number,
            ("close_date", CellValue::Date(date)) => self.close_date = Some(*date),
            ("close_date", CellValue::Null) => self.close_date = None,
            ("strategic", CellValue::Bool(flag)) => self.strategic = *flag,
            _ => return false,
        }
        true
    }
}

/// A recurring-revenue account row.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub id: i64,
    pub customer: String,
    pub plan: String,
    pub mrr_cents: i64,
    pub seats: u32,
    pub renews_on: Date,
    pub auto_renew: bool,
    pub health: f64,
}

impl RowValues for Subscription {
    fn value(&self, key: &str) -> CellValue {
        match key {
            "customer" => CellValue::text(&self.customer),
            "plan" => CellValue::text(&self.plan),
            "mrr" => CellValue::Cents(self.mrr_cents),
            "seats" => CellValue::Number(f64::from(self.seats)),
            "renews_on" => CellValue::Date(self.renews_on),
            "auto_renew" => CellValue::Bool(self.auto_renew),
            "health" => CellValue::Number(self.health),
            _ => CellValue::Null,
        }
    }
}

impl TableRow for Subscription {
    fn row_id(&self) -> RowId {
        RowId::new(self.id)
    }
}

/// Deterministic generator for pipeline and subscription fixtures.
#[derive(Debug, Clone)]
pub struct PipelineFaker {
    rng: DeterministicRng,
    next_id: i64,
}

impl PipelineFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 1,
        }
    }

    pub fn opportunity(&mut self) -> Opportunity {
        let id = self.take_id();
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let account = self.company();
        let slug = account.to_lowercase().replace(' ', "");
        let stage = self.pick(&STAGES);
        let probability = match stage {
            "Prospecting" => 10.0,
            "Qualification" => 25.0,
            "Proposal" => 50.0,
            "Negotiation" => 75.0,
            "Closed Won" => 100.0,
            _ => 0.0,
        };
        Opportunity {
            id,
            account,
            owner: format!("{first} {last}"),
            owner_email: format!("{}.{}@{slug}.example", first.to_lowercase(), last.to_lowercase()),
            stage: stage.to_owned(),
            region: self.pick(&REGIONS).to_owned(),
            amount_cents: (!self.rng.chance(10)).then(|| self.rng.int_range(5, 2_500) * 100_000),
            probability,
            close_date: (!self.rng.chance(15))
                .then(|| REFERENCE_DAY + Duration::days(self.rng.int_range(-90, 270))),
            last_activity: REFERENCE_NOW - Duration::minutes(self.rng.int_range(0, 60 * 24 * 60)),
            website: format!("https://www.{slug}.example/"),
            phone: format!(
                "+1 555-{:03}-{:04}",
                self.rng.int_range(100, 999),
                self.rng.int_range(0, 9999)
            ),
            priority: self.rng.int_range(1, 5) as u8,
            strategic: self.rng.chance(20),
        }
    }

    pub fn subscription(&mut self) -> Subscription {
        let id = self.take_id();
        let plan_index = self.rng.int_n(PLANS.len());
        let seats = self.rng.int_range(3, 400) as u32;
        let per_seat = [900, 1_500, 2_900, 4_900][plan_index];
        Subscription {
            id,
            customer: self.company(),
            plan: PLANS[plan_index].to_owned(),
            mrr_cents: i64::from(seats) * per_seat,
            seats,
            renews_on: REFERENCE_DAY + Duration::days(self.rng.int_range(1, 365)),
            auto_renew: self.rng.chance(70),
            health: self.rng.int_range(5, 100) as f64,
        }
    }

    fn company(&mut self) -> String {
        format!(
            "{} {}",
            self.pick(&COMPANY_PREFIXES),
            self.pick(&COMPANY_SUFFIXES)
        )
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn take_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

pub fn sample_opportunities(count: usize) -> Vec<Opportunity> {
    let mut faker = PipelineFaker::new(7);
    (0..count).map(|_| faker.opportunity()).collect()
}

pub fn sample_subscriptions(count: usize) -> Vec<Subscription> {
    let mut faker = PipelineFaker::new(11);
    (0..count).map(|_| faker.subscription()).collect()
}

/// Opportunity table schema touching most column types.
pub fn opportunity_columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("account", "Account", ColumnType::Text)
            .with_width(220)
            .with_editable(true)
            .with_validator(|value| match value {
                CellValue::Null => Err("account is required".to_owned()),
                _ => Ok(()),
            }),
        ColumnDefinition::new("owner", "Owner", ColumnType::Text),
        ColumnDefinition::new("owner_email", "Email", ColumnType::Email)
            .with_accessor(Accessor::key("owner.email"))
            .with_sortable(false),
        ColumnDefinition::new("stage", "Stage", ColumnType::Badge)
            .with_width(140)
            .with_editable(true),
        ColumnDefinition::new("region", "Region", ColumnType::Select),
        ColumnDefinition::new("amount", "Amount", ColumnType::Currency).with_editable(true),
        ColumnDefinition::new("probability", "Prob.", ColumnType::Percentage)
            .with_width(90)
            .with_editable(true),
        ColumnDefinition::new("weighted", "Weighted", ColumnType::Currency)
            .with_accessor(Accessor::computed(|row| {
                match (row.value("amount"), row.value("probability")) {
                    (CellValue::Cents(cents), CellValue::Number(percent)) => {
                        CellValue::Cents((cents as f64 * percent / 100.0).round() as i64)
                    }
                    _ => CellValue::Null,
                }
            })),
        ColumnDefinition::new("close_date", "Close", ColumnType::Date).with_editable(true),
        ColumnDefinition::new("last_activity", "Last activity", ColumnType::DateTime)
            .with_width(170),
        ColumnDefinition::new("priority", "Priority", ColumnType::Rating).with_resizable(false),
        ColumnDefinition::new("strategic", "Strategic", ColumnType::Boolean).with_editable(true),
        ColumnDefinition::new("website", "Website", ColumnType::Url).with_sortable(false),
        ColumnDefinition::new("phone", "Phone", ColumnType::Phone).with_sortable(false),
    ]
}

pub fn subscription_columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("customer", "Customer", ColumnType::Text).with_width(200),
        ColumnDefinition::new("plan", "Plan", ColumnType::Select),
        ColumnDefinition::new("mrr", "MRR", ColumnType::Currency),
        ColumnDefinition::new("seats", "Seats", ColumnType::Number).with_width(90),
        ColumnDefinition::new("renews_on", "Renews", ColumnType::Date),
        ColumnDefinition::new("auto_renew", "Auto-renew", ColumnType::Boolean),
        ColumnDefinition::new("health", "Health", ColumnType::Progress).with_width(180),
    ]
}

/// Input prompt used by the "reassign owner" custom action in fixtures.
pub fn reassign_input() -> InputSpec {
    InputSpec::select(FIRST_NAMES)
}

/// A listener registry that counts attachments, plus the same registry as
/// the trait object engines take.
pub fn tracking_registry() -> (Rc<TrackingRegistry>, Rc<dyn ListenerRegistry>) {
    let tracker = TrackingRegistry::shared();
    let registry: Rc<dyn ListenerRegistry> = tracker.clone();
    (tracker, registry)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAction {
    pub action_id: String,
    pub selected: Vec<RowId>,
    pub input: Option<String>,
}

/// Bulk handler that records every call and optionally fails.
#[derive(Debug, Clone, Default)]
pub struct RecordingHandler {
    pub calls: Vec<RecordedAction>,
    pub fail_with: Option<String>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            calls: Vec::new(),
            fail_with: Some(message.to_owned()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.len()
    }
}

impl BulkActionHandler for RecordingHandler {
    fn on_action(
        &mut self,
        action_id: &str,
        selected: &[RowId],
        input: Option<&str>,
    ) -> Result<()> {
        self.calls.push(RecordedAction {
            action_id: action_id.to_owned(),
            selected: selected.to_vec(),
            input: input.map(str::to_owned),
        });
        match &self.fail_with {
            Some(message) => Err(anyhow!("{message}")),
            None => Ok(()),
        }
    }
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("tabula.db");
    Ok((dir, db_path))
}
