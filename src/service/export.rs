use crate::error::{QuoteError, QuoteResult};
use crate::models::DraftSnapshot;

const HEADER: [&str; 6] = ["Item", "Description", "Qty", "Unit", "Rate (Rs.)", "Amount (Rs.)"];

/// 导出草稿明细与汇总到 CSV，供下游渲染使用
pub fn snapshot_to_csv(snapshot: &DraftSnapshot, quote_no: Option<&str>) -> QuoteResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    if let Some(no) = quote_no {
        write_row(&mut writer, ["Quotation No", no, "", "", "", ""])?;
    }
    write_row(&mut writer, HEADER)?;

    for item in &snapshot.items {
        let quantity = item.quantity.to_string();
        let rate = item.rate.to_string();
        let amount = item.amount.to_string();
        write_row(
            &mut writer,
            [
                item.name.as_str(),
                item.description.as_str(),
                quantity.as_str(),
                item.unit.as_str(),
                rate.as_str(),
                amount.as_str(),
            ],
        )?;
    }

    let subtotal = snapshot.subtotal.to_string();
    let tax = snapshot.tax_amount.to_string();
    let total = snapshot.grand_total.to_string();
    write_row(&mut writer, ["", "", "", "", "SUBTOTAL", subtotal.as_str()])?;
    write_row(&mut writer, ["", "", "", "", "GST", tax.as_str()])?;
    write_row(&mut writer, ["", "", "", "", "GRAND TOTAL", total.as_str()])?;

    writer
        .into_inner()
        .map_err(|e| QuoteError::Export(e.to_string()))
}

fn write_row(writer: &mut csv::Writer<Vec<u8>>, row: [&str; 6]) -> QuoteResult<()> {
    writer
        .write_record(row)
        .map_err(|e| QuoteError::Export(e.to_string()))
}
