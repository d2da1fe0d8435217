//! Invoice documents issued for completed milestone payments.

pub mod pdf;

use chrono::{DateTime, Utc};

/// Everything printed on an invoice, already resolved to display strings.
#[derive(Debug, Clone)]
pub struct InvoiceDocument {
    pub invoice_number: String,
    pub issued_at: DateTime<Utc>,
    pub project_title: String,
    pub milestone_title: String,
    pub client_name: String,
    pub freelancer_name: String,
    pub amount: f64,
    pub currency: String,
}

impl InvoiceDocument {
    /// The text lines of the invoice body, top to bottom.
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("Invoice {}", self.invoice_number),
            format!("Issued: {}", self.issued_at.format("%Y-%m-%d")),
            String::new(),
            format!("Project: {}", self.project_title),
            format!("Milestone: {}", self.milestone_title),
            String::new(),
            format!("Billed to: {}", self.client_name),
            format!("Paid to: {}", self.freelancer_name),
            String::new(),
            format!(
                "Amount: {:.2} {}",
                self.amount,
                self.currency.to_uppercase()
            ),
            String::from("Status: Paid"),
        ]
    }

    pub fn render(&self) -> Result<Vec<u8>, printpdf::Error> {
        pdf::render(&format!("Invoice {}", self.invoice_number), &self.lines())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn document() -> InvoiceDocument {
        InvoiceDocument {
            invoice_number: "INV-20250309-1A2B3C4D".to_string(),
            issued_at: Utc.with_ymd_and_hms(2025, 3, 9, 12, 0, 0).unwrap(),
            project_title: "Mobile app".to_string(),
            milestone_title: "Deliver app".to_string(),
            client_name: "Client Co".to_string(),
            freelancer_name: "freelancer@example.com".to_string(),
            amount: 450.0,
            currency: "usd".to_string(),
        }
    }

    #[test]
    fn lines_carry_parties_and_amount() {
        let lines = document().lines();
        assert_eq!(lines[0], "Invoice INV-20250309-1A2B3C4D");
        assert_eq!(lines[1], "Issued: 2025-03-09");
        assert!(lines.contains(&"Milestone: Deliver app".to_string()));
        assert!(lines.contains(&"Billed to: Client Co".to_string()));
        assert!(lines.contains(&"Amount: 450.00 USD".to_string()));
    }

    #[test]
    fn render_produces_pdf_bytes() {
        let pdf = document().render().unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
    }
}
