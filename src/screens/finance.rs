//! Fees, invoices, payments, income and expenses, plus the summary report.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{forms_view, ScreenController};
use crate::api::ApiClient;
use crate::form::{FieldKind, FieldSpec, Form, FormSpec, Initial};
use crate::model::{format_amount, lookup_text, Record, Role};
use crate::notify::Notices;
use crate::remote::RemoteCollection;

const ADMIN: &[Role] = &[Role::Admin];

/// Roles the backend lets read income, expenses and the summary report.
pub const LEDGER_ROLES: &[Role] = ADMIN;

pub static FEE_TYPE_FORM: FormSpec = FormSpec {
    key: "feeType",
    success: "Fee type created successfully",
    failure: "Failed to create fee type",
    endpoint: "/fee-types",
    fields: &[
        FieldSpec::text("name").required(),
        FieldSpec::text("description"),
        FieldSpec::new("amount", FieldKind::Float),
    ],
    write_roles: ADMIN,
};

pub static FEE_STRUCTURE_FORM: FormSpec = FormSpec {
    key: "feeStructure",
    success: "Fee structure created successfully",
    failure: "Failed to create fee structure",
    endpoint: "/fee-structures",
    fields: &[
        FieldSpec::text("class_id").required(),
        FieldSpec::text("fee_type_id").required(),
        FieldSpec::new("amount", FieldKind::Float).required(),
        FieldSpec::text("frequency").default_to(Initial::Fixed("monthly")),
    ],
    write_roles: ADMIN,
};

pub static INVOICE_FORM: FormSpec = FormSpec {
    key: "invoice",
    success: "Invoice generated successfully",
    failure: "Failed to generate invoice",
    endpoint: "/invoices",
    fields: &[
        FieldSpec::text("student_id").required(),
        FieldSpec::text("fee_structure_id"),
        FieldSpec::new("amount", FieldKind::Float).required(),
        FieldSpec::new("due_date", FieldKind::Date).required(),
        FieldSpec::text("description"),
    ],
    write_roles: ADMIN,
};

pub static PAYMENT_FORM: FormSpec = FormSpec {
    key: "payment",
    success: "Payment recorded successfully",
    failure: "Failed to record payment",
    endpoint: "/payments",
    fields: &[
        FieldSpec::text("invoice_id").required(),
        FieldSpec::new("amount", FieldKind::Float).required(),
        FieldSpec::text("payment_method").default_to(Initial::Fixed("cash")),
        FieldSpec::text("transaction_id"),
        FieldSpec::new("payment_date", FieldKind::Date).default_to(Initial::Today),
    ],
    write_roles: ADMIN,
};

pub static INCOME_FORM: FormSpec = FormSpec {
    key: "income",
    success: "Income recorded successfully",
    failure: "Failed to record income",
    endpoint: "/income",
    fields: &[
        FieldSpec::new("amount", FieldKind::Float).required(),
        FieldSpec::text("category").default_to(Initial::Fixed("donation")),
        FieldSpec::text("description").required(),
        FieldSpec::new("date", FieldKind::Date).default_to(Initial::Today),
    ],
    write_roles: ADMIN,
};

pub static EXPENSE_FORM: FormSpec = FormSpec {
    key: "expense",
    success: "Expense recorded successfully",
    failure: "Failed to record expense",
    endpoint: "/expenses",
    fields: &[
        FieldSpec::new("amount", FieldKind::Float).required(),
        FieldSpec::text("category").default_to(Initial::Fixed("salary")),
        FieldSpec::text("description").required(),
        FieldSpec::new("date", FieldKind::Date).default_to(Initial::Today),
    ],
    write_roles: ADMIN,
};

/// Summary computed by the backend. Older deployments use `fee_collection`
/// and `net_balance`; newer ones `total_fee_collected` and `net_profit`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FinancialReport {
    #[serde(default)]
    pub total_income: f64,
    #[serde(default)]
    pub total_expenses: f64,
    #[serde(default, alias = "fee_collection")]
    pub total_fee_collected: f64,
    #[serde(default)]
    pub total_pending_fees: f64,
    #[serde(default, alias = "net_balance")]
    pub net_profit: f64,
}

impl FinancialReport {
    pub fn view(&self) -> Value {
        json!({
            "totalIncome": format_amount(self.total_income),
            "totalExpenses": format_amount(self.total_expenses),
            "feeCollected": format_amount(self.total_fee_collected),
            "pendingFees": format_amount(self.total_pending_fees),
            "netBalance": format_amount(self.net_profit),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportRange {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl ReportRange {
    fn query(&self) -> Vec<(String, String)> {
        let mut q = Vec::new();
        if let Some(from) = self.date_from.as_deref().filter(|s| !s.is_empty()) {
            q.push(("date_from".to_string(), from.to_string()));
        }
        if let Some(to) = self.date_to.as_deref().filter(|s| !s.is_empty()) {
            q.push(("date_to".to_string(), to.to_string()));
        }
        q
    }
}

pub struct FinanceScreen {
    fee_types: RemoteCollection<Record>,
    fee_structures: RemoteCollection<Record>,
    invoices: RemoteCollection<Record>,
    payments: RemoteCollection<Record>,
    income: RemoteCollection<Record>,
    expenses: RemoteCollection<Record>,
    classes: RemoteCollection<Record>,
    students: RemoteCollection<Record>,
    forms: [Form; 6],
    range: ReportRange,
    report: Option<FinancialReport>,
    viewer: Option<Role>,
}

impl Default for FinanceScreen {
    fn default() -> Self {
        Self {
            fee_types: RemoteCollection::new("fee types", "/fee-types"),
            fee_structures: RemoteCollection::new("fee structures", "/fee-structures"),
            invoices: RemoteCollection::new("invoices", "/invoices"),
            payments: RemoteCollection::new("payments", "/payments"),
            income: RemoteCollection::new("income", "/income"),
            expenses: RemoteCollection::new("expenses", "/expenses"),
            classes: RemoteCollection::new("classes", "/classes"),
            students: RemoteCollection::new("students", "/students"),
            forms: [
                Form::new(&FEE_TYPE_FORM),
                Form::new(&FEE_STRUCTURE_FORM),
                Form::new(&INVOICE_FORM),
                Form::new(&PAYMENT_FORM),
                Form::new(&INCOME_FORM),
                Form::new(&EXPENSE_FORM),
            ],
            range: ReportRange::default(),
            report: None,
            viewer: None,
        }
    }
}

impl FinanceScreen {
    /// Whether the viewer may see income, expenses and the report. Other
    /// viewers never request them.
    pub fn ledger_visible(&self) -> bool {
        self.viewer.map(|r| LEDGER_ROLES.contains(&r)).unwrap_or(false)
    }

    pub fn report(&self) -> Option<&FinancialReport> {
        self.report.as_ref()
    }

    /// Invoices a payment can still be recorded against.
    pub fn unpaid_invoices(&self) -> Vec<&Record> {
        self.invoices
            .items()
            .iter()
            .filter(|i| i.text("status") != Some("paid"))
            .collect()
    }

    pub async fn load_report(&mut self, range: ReportRange, api: &ApiClient, notices: &mut Notices) -> bool {
        self.range = range;
        self.fetch_report(api, notices).await
    }

    async fn fetch_report(&mut self, api: &ApiClient, notices: &mut Notices) -> bool {
        if !self.ledger_visible() {
            self.report = None;
            return false;
        }
        let outcome = api.get_json("/financial-reports", &self.range.query()).await;
        match outcome.map(serde_json::from_value::<FinancialReport>) {
            Ok(Ok(report)) => {
                self.report = Some(report);
                true
            }
            Ok(Err(e)) => {
                tracing::warn!(event = "financial_report_decode_failed", error = %e);
                self.report = None;
                notices.error("Failed to fetch financial report");
                false
            }
            Err(e) => {
                tracing::warn!(event = "financial_report_failed", error = %e);
                self.report = None;
                notices.error("Failed to fetch financial report");
                false
            }
        }
    }

    fn with_names(&self, r: &Record) -> Value {
        let fk = |field: &str| r.text(field).unwrap_or("").to_string();
        let mut extra: Vec<(&'static str, Value)> = Vec::new();
        if r.get("class_id").is_some() {
            extra.push(("className", json!(lookup_text(self.classes.items(), &fk("class_id"), "name"))));
        }
        if r.get("fee_type_id").is_some() {
            extra.push((
                "feeTypeName",
                json!(lookup_text(self.fee_types.items(), &fk("fee_type_id"), "name")),
            ));
        }
        if r.get("student_id").is_some() {
            extra.push(("studentName", json!(lookup_text(self.students.items(), &fk("student_id"), "name"))));
        }
        if r.get("invoice_id").is_some() {
            extra.push((
                "invoiceNumber",
                json!(lookup_text(self.invoices.items(), &fk("invoice_id"), "invoice_number")),
            ));
        }
        if let Some(amount) = r.get("amount").and_then(|v| v.as_f64()) {
            extra.push(("amountText", json!(format_amount(amount))));
        }
        r.with_fields(extra)
    }

    fn rows(&self, c: &RemoteCollection<Record>) -> Vec<Value> {
        c.items().iter().map(|r| self.with_names(r)).collect()
    }
}

#[async_trait]
impl ScreenController for FinanceScreen {
    async fn activate(&mut self, api: &ApiClient, notices: &mut Notices) {
        let ledger = self.ledger_visible();
        for c in [
            &mut self.fee_types,
            &mut self.fee_structures,
            &mut self.invoices,
            &mut self.payments,
            &mut self.classes,
            &mut self.students,
        ] {
            c.begin();
        }
        if ledger {
            self.income.begin();
            self.expenses.begin();
        }
        let (income_c, expenses_c) = (&self.income, &self.expenses);
        let (fee_types, fee_structures, invoices, payments, income, expenses, classes, students) = futures::join!(
            self.fee_types.load(api),
            self.fee_structures.load(api),
            self.invoices.load(api),
            self.payments.load(api),
            async move {
                if ledger {
                    Some(income_c.load(api).await)
                } else {
                    None
                }
            },
            async move {
                if ledger {
                    Some(expenses_c.load(api).await)
                } else {
                    None
                }
            },
            self.classes.load(api),
            self.students.load(api)
        );
        self.fee_types.settle(fee_types, notices);
        self.fee_structures.settle(fee_structures, notices);
        self.invoices.settle(invoices, notices);
        self.payments.settle(payments, notices);
        self.income.settle(income.unwrap_or(Ok(Vec::new())), notices);
        self.expenses.settle(expenses.unwrap_or(Ok(Vec::new())), notices);
        self.classes.settle(classes, notices);
        self.students.settle(students, notices);
        self.fetch_report(api, notices).await;
    }

    fn set_viewer(&mut self, role: Option<Role>) {
        self.viewer = role;
    }

    fn is_loading(&self) -> bool {
        [
            &self.fee_types,
            &self.fee_structures,
            &self.invoices,
            &self.payments,
            &self.income,
            &self.expenses,
            &self.classes,
            &self.students,
        ]
        .iter()
        .any(|c| c.is_loading())
    }

    fn view(&self) -> Value {
        let mut out = Map::new();
        out.insert("loading".into(), json!(self.is_loading()));
        out.insert("ledgerVisible".into(), json!(self.ledger_visible()));
        out.insert("feeTypes".into(), json!(self.rows(&self.fee_types)));
        out.insert("feeStructures".into(), json!(self.rows(&self.fee_structures)));
        out.insert("invoices".into(), json!(self.rows(&self.invoices)));
        out.insert("unpaidInvoices".into(), json!(self.unpaid_invoices()));
        out.insert("payments".into(), json!(self.rows(&self.payments)));
        out.insert("income".into(), json!(self.rows(&self.income)));
        out.insert("expenses".into(), json!(self.rows(&self.expenses)));
        out.insert("classes".into(), json!(self.classes.items()));
        out.insert("students".into(), json!(self.students.items()));
        out.insert("report".into(), self.report.as_ref().map(|r| r.view()).unwrap_or(Value::Null));
        out.insert("forms".into(), forms_view(self.forms.iter()));
        Value::Object(out)
    }

    fn form_mut(&mut self, key: &str) -> Option<&mut Form> {
        self.forms.iter_mut().find(|f| f.spec().key == key)
    }
}
