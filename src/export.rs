use crate::voucher::Voucher;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fmt;
use std::path::Path;

pub const ORG: &str = "NamPhat";
const COMPANY_BANNER: &str = "CÔNG TY TNHH NAM PHÁT VIỆT NAM";
const DETAIL_TITLE: &str = "PHIẾU NHẬP XUẤT HÀNG HÓA CHI TIẾT";

const ITEM_HEADER: &[&str] = &["STT", "Mặt hàng", "Số lượng", "Đơn giá", "Thành tiền"];
const HISTORY_HEADER: &[&str] = &[
    "Mã phiếu",
    "Ngày",
    "Đơn vị nhận",
    "Lái xe",
    "Giá chuyến",
    "STT",
    "Mặt hàng",
    "Số lượng",
    "Đơn giá",
    "Thành tiền",
    "Tổng đơn",
];

pub fn detail_filename(voucher: &Voucher) -> String {
    format!("{}_Detail_{}.csv", ORG, voucher.id)
}

pub fn history_filename() -> String {
    format!("{}_TongHop_LichSu.csv", ORG)
}

/// The fixed-layout detail sheet: banner, header block, item table,
/// grand total, notes, signature block.
pub fn detail_rows(voucher: &Voucher) -> Vec<Vec<String>> {
    let mut rows = vec![
        vec![COMPANY_BANNER.to_owned()],
        vec![DETAIL_TITLE.to_owned()],
        vec![String::new()],
        vec!["Mã phiếu:".to_owned(), voucher.id.to_string()],
        vec!["Ngày:".to_owned(), voucher.date.to_string()],
        vec!["Đơn vị nhận:".to_owned(), voucher.recipient_unit.clone()],
        vec!["Lái xe:".to_owned(), voucher.driver_name.clone()],
        vec![
            "Giá chuyến xe:".to_owned(),
            format!("{} VNĐ", voucher.driver_trip_cost),
        ],
        vec![String::new()],
        ITEM_HEADER.iter().map(|s| s.to_string()).collect(),
    ];
    for item in &voucher.items {
        rows.push(vec![
            item.stt.to_string(),
            item.item_name.clone(),
            item.quantity.to_string(),
            item.unit_price.to_string(),
            item.total.to_string(),
        ]);
    }
    rows.push(vec![String::new()]);
    rows.push(vec![
        String::new(),
        String::new(),
        String::new(),
        "TỔNG CỘNG:".to_owned(),
        format!("{} VNĐ", voucher.grand_total),
    ]);
    rows.push(vec![String::new()]);
    rows.push(vec![
        "Ghi chú:".to_owned(),
        voucher
            .notes
            .clone()
            .unwrap_or_else(|| "Không có".to_owned()),
    ]);
    rows.push(vec![String::new()]);
    rows.push(
        ["Bên xuất", "", "Bên vận chuyển", "", "Bên nhập"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );
    rows.push(
        ["(Ký tên)", "", "(Ký tên)", "", "(Ký tên)"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );
    rows
}

/// The bulk history sheet: one flattened row per line item across the
/// whole collection, in collection order.
pub fn history_rows(records: &[Voucher]) -> Vec<Vec<String>> {
    let mut rows = vec![HISTORY_HEADER.iter().map(|s| s.to_string()).collect()];
    for record in records {
        for item in &record.items {
            rows.push(vec![
                record.id.to_string(),
                record.date.to_string(),
                record.recipient_unit.clone(),
                record.driver_name.clone(),
                record.driver_trip_cost.to_string(),
                item.stt.to_string(),
                item.item_name.clone(),
                item.quantity.to_string(),
                item.unit_price.to_string(),
                item.total.to_string(),
                record.grand_total.to_string(),
            ]);
        }
    }
    rows
}

/// Encodes rows into the given file. Detail rows vary in width, so the
/// writer runs flexible.
pub fn write_rows(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .context(format!("Cannot open {:?} for export", path))?;
    for row in rows {
        writer.write_record(row).context("CSV write error")?;
    }
    writer.flush().context("CSV flush error")?;
    Ok(())
}

/// Read-only print rendering of one voucher: the same fields as the
/// detail export, laid out as padded text.
pub struct PrintForm<'a>(pub &'a Voucher);

impl fmt::Display for PrintForm<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let voucher = self.0;
        writeln!(f, "{COMPANY_BANNER}")?;
        writeln!(f, "{DETAIL_TITLE}")?;
        writeln!(f)?;
        writeln!(f, "Mã phiếu:      {}", voucher.id)?;
        writeln!(f, "Ngày:          {}", voucher.date)?;
        writeln!(f, "Đơn vị nhận:   {}", voucher.recipient_unit)?;
        let driver = if voucher.driver_name.is_empty() {
            "N/A"
        } else {
            voucher.driver_name.as_str()
        };
        writeln!(f, "Lái xe:        {}", driver)?;
        writeln!(f, "Giá chuyến xe: {} VNĐ", voucher.driver_trip_cost)?;
        writeln!(f)?;
        writeln!(
            f,
            "{:>3} | {:<24} | {:>10} | {:>14} | {:>14}",
            "STT", "Mặt hàng", "Số lượng", "Đơn giá", "Thành tiền"
        )?;
        for item in &voucher.items {
            writeln!(
                f,
                "{:>3} | {:<24} | {:>10} | {:>14} | {:>14}",
                item.stt,
                item.item_name,
                item.quantity,
                item.unit_price.to_string(),
                item.total.to_string()
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Tổng giá trị hàng hóa: {} VNĐ", voucher.items_total())?;
        writeln!(f, "TỔNG CỘNG:             {} VNĐ", voucher.grand_total)?;
        if let Some(notes) = &voucher.notes {
            writeln!(f)?;
            writeln!(f, "Ghi chú: {notes}")?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:<20} {:<20} {:<20}",
            "Bên xuất", "Bên vận chuyển", "Bên nhập"
        )?;
        writeln!(f, "{:<20} {:<20} {:<20}", "(Ký tên)", "(Ký tên)", "(Ký tên)")?;
        Ok(())
    }
}
