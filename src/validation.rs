//! Validation logic for bill batch payloads
//!
//! Validates batch-creation requests before any row is written. GST items
//! carry mandatory invoice/tax fields; advance items must carry none of them.

use crate::contracts::bill_batch_v1::{BillItem, BillType};
use thiserror::Error;

/// Validation errors for bill batch requests
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("cost_code cannot be empty")]
    EmptyCostCode,

    #[error("items must have at least 1 entry")]
    EmptyItems,

    #[error("Item {0}: {1} cannot be empty")]
    EmptyItemField(usize, &'static str),

    #[error("Item {0}: amount_minor must be positive, got {1}")]
    NonPositiveAmount(usize, i64),

    #[error("Item {0}: gst items require {1}")]
    MissingGstField(usize, &'static str),

    #[error("Item {0}: invalid GSTIN: {1}")]
    InvalidGstin(usize, String),

    #[error("Item {0}: gst items require either IGST or CGST+SGST with non-negative amounts")]
    InvalidGstStructure(usize),

    #[error("Item {0}: advance items must not carry invoice or GST fields")]
    AdvanceWithInvoiceFields(usize),

    #[error("store_id is required for advance vouchers")]
    AdvanceRequiresStore,
}

/// Validate a bill batch payload
///
/// # Validation Rules
///
/// - `cost_code`: non-empty
/// - `items`: at least 1 entry
/// - Each item: `supplier_name`, `nature_of_expense`, `head_of_accounts`,
///   `instructed_by` non-empty; `amount_minor` > 0
/// - gst items: `supplier_gst` (valid GSTIN), `taxable_amount_minor`,
///   `invoice_date`, `invoice_reference_number` all present, plus either
///   (`igst_rate_bp` > 0 with `igst_minor` >= 0) or
///   (`cgst_rate_bp` > 0 and `sgst_rate_bp` > 0 with both amounts >= 0)
/// - advance items: no invoice or GST field may be present; the batch must
///   name a `store_id` (advance sequences are scoped per store)
pub fn validate_bill_batch(
    billtype: BillType,
    cost_code: &str,
    store_id_present: bool,
    items: &[BillItem],
) -> Result<(), ValidationError> {
    if cost_code.trim().is_empty() {
        return Err(ValidationError::EmptyCostCode);
    }

    if items.is_empty() {
        return Err(ValidationError::EmptyItems);
    }

    if billtype == BillType::Advance && !store_id_present {
        return Err(ValidationError::AdvanceRequiresStore);
    }

    for (idx, item) in items.iter().enumerate() {
        validate_item(billtype, item, idx)?;
    }

    Ok(())
}

/// Validate a single line item
fn validate_item(billtype: BillType, item: &BillItem, index: usize) -> Result<(), ValidationError> {
    if item.supplier_name.trim().is_empty() {
        return Err(ValidationError::EmptyItemField(index, "supplier_name"));
    }
    if item.nature_of_expense.trim().is_empty() {
        return Err(ValidationError::EmptyItemField(index, "nature_of_expense"));
    }
    if item.head_of_accounts.trim().is_empty() {
        return Err(ValidationError::EmptyItemField(index, "head_of_accounts"));
    }
    if item.instructed_by.trim().is_empty() {
        return Err(ValidationError::EmptyItemField(index, "instructed_by"));
    }

    if item.amount_minor <= 0 {
        return Err(ValidationError::NonPositiveAmount(index, item.amount_minor));
    }

    match billtype {
        BillType::Gst => validate_gst_fields(item, index),
        BillType::Advance => validate_advance_fields(item, index),
        BillType::NonGst => Ok(()),
    }
}

fn validate_gst_fields(item: &BillItem, index: usize) -> Result<(), ValidationError> {
    let gstin = item
        .supplier_gst
        .as_deref()
        .ok_or(ValidationError::MissingGstField(index, "supplier_gst"))?;

    if !is_valid_gstin(gstin) {
        return Err(ValidationError::InvalidGstin(index, gstin.to_string()));
    }

    if item.taxable_amount_minor.is_none() {
        return Err(ValidationError::MissingGstField(index, "taxable_amount_minor"));
    }
    if item.invoice_date.is_none() {
        return Err(ValidationError::MissingGstField(index, "invoice_date"));
    }
    if item.invoice_reference_number.is_none() {
        return Err(ValidationError::MissingGstField(
            index,
            "invoice_reference_number",
        ));
    }

    let has_igst =
        item.igst_rate_bp.unwrap_or(0) > 0 && item.igst_minor.unwrap_or(-1) >= 0;
    let has_cgst_sgst = item.cgst_rate_bp.unwrap_or(0) > 0
        && item.sgst_rate_bp.unwrap_or(0) > 0
        && item.cgst_minor.unwrap_or(-1) >= 0
        && item.sgst_minor.unwrap_or(-1) >= 0;

    if !has_igst && !has_cgst_sgst {
        return Err(ValidationError::InvalidGstStructure(index));
    }

    Ok(())
}

fn validate_advance_fields(item: &BillItem, index: usize) -> Result<(), ValidationError> {
    let carries_invoice_or_gst = item.invoice_date.is_some()
        || item.invoice_reference_number.is_some()
        || item.supplier_gst.is_some()
        || item.taxable_amount_minor.is_some()
        || item.igst_rate_bp.is_some()
        || item.cgst_rate_bp.is_some()
        || item.sgst_rate_bp.is_some()
        || item.igst_minor.is_some()
        || item.cgst_minor.is_some()
        || item.sgst_minor.is_some()
        || item.rounding_off_minor.is_some();

    if carries_invoice_or_gst {
        return Err(ValidationError::AdvanceWithInvoiceFields(index));
    }

    Ok(())
}

/// Check a GSTIN: 2 digits, 5 uppercase letters, 4 digits, 1 uppercase
/// letter, 1 entity code in [1-9A-Z], the literal 'Z', 1 check character
/// in [0-9A-Z]. 15 characters total.
pub fn is_valid_gstin(gstin: &str) -> bool {
    let b = gstin.as_bytes();
    if b.len() != 15 {
        return false;
    }

    b[0].is_ascii_digit()
        && b[1].is_ascii_digit()
        && b[2..7].iter().all(|c| c.is_ascii_uppercase())
        && b[7..11].iter().all(|c| c.is_ascii_digit())
        && b[11].is_ascii_uppercase()
        && (b[12].is_ascii_uppercase() || (b'1'..=b'9').contains(&b[12]))
        && b[13] == b'Z'
        && (b[14].is_ascii_uppercase() || b[14].is_ascii_digit())
}
