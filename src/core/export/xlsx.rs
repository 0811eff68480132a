//! The roster sheet: one styled header row, one row per student and an
//! optional picture in the first column.

use super::images::EmbeddedImage;
use super::ExportRow;
use crate::utils::error::Result;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Image, Workbook, Worksheet};

pub const SHEET_NAME: &str = "Talabalar Ro'yxati";

const HEADER_HEIGHT: f64 = 30.0;
const ROW_HEIGHT: f64 = 60.0;

const IMAGE_SIZE_PX: u32 = 50;
const IMAGE_X_OFFSET_PX: u32 = 11;
const IMAGE_Y_OFFSET_PX: u32 = 8;

const HEADER_FILL: u32 = 0x475569;
const BORDER_COLOR: u32 = 0xCBD5E1;

pub struct Column {
    pub header: &'static str,
    pub width: u32,
}

pub const COLUMNS: [Column; 9] = [
    Column { header: "Rasm", width: 10 },
    Column { header: "TTJ", width: 25 },
    Column { header: "Xona", width: 10 },
    Column { header: "F.I.SH", width: 35 },
    Column { header: "Kurs", width: 10 },
    Column { header: "Guruh", width: 15 },
    Column { header: "Fakultet", width: 30 },
    Column { header: "Yo'nalish", width: 30 },
    Column { header: "Qo'shilgan sana", width: 15 },
];

struct SheetFormats {
    header: Format,
    body: Format,
    center: Format,
}

impl SheetFormats {
    fn new() -> Self {
        let header = Format::new()
            .set_bold()
            .set_font_size(12)
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(HEADER_FILL))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);

        let bordered = Format::new()
            .set_border(FormatBorder::Thin)
            .set_border_color(Color::RGB(BORDER_COLOR))
            .set_align(FormatAlign::VerticalCenter);

        Self {
            header,
            body: bordered.clone().set_align(FormatAlign::Left).set_text_wrap(),
            center: bordered.set_align(FormatAlign::Center),
        }
    }
}

fn write_row(sheet: &mut Worksheet, row_index: u32, row: &ExportRow, formats: &SheetFormats) -> Result<()> {
    let joined = row.joined_date.format("%Y-%m-%d").to_string();

    sheet.set_row_height(row_index, ROW_HEIGHT)?;
    sheet.write_blank(row_index, 0, &formats.body)?;
    sheet.write_string_with_format(row_index, 1, row.dormitory.as_str(), &formats.body)?;
    sheet.write_number_with_format(row_index, 2, row.room, &formats.center)?;
    sheet.write_string_with_format(row_index, 3, row.full_name.as_str(), &formats.body)?;
    sheet.write_number_with_format(row_index, 4, row.course, &formats.center)?;
    sheet.write_string_with_format(row_index, 5, row.group.as_str(), &formats.center)?;
    sheet.write_string_with_format(row_index, 6, row.faculty.as_str(), &formats.body)?;
    sheet.write_string_with_format(row_index, 7, row.direction.as_str(), &formats.body)?;
    sheet.write_string_with_format(row_index, 8, joined.as_str(), &formats.body)?;
    Ok(())
}

/// Pictures the writer cannot parse are left out; the row itself stays.
fn insert_picture(sheet: &mut Worksheet, row_index: u32, image: &EmbeddedImage) -> Result<bool> {
    let picture = match Image::new_from_buffer(&image.bytes) {
        Ok(picture) => picture.set_scale_to_size(IMAGE_SIZE_PX, IMAGE_SIZE_PX, true),
        Err(e) => {
            tracing::warn!("Skipping unreadable {} picture in row {}: {}", image.kind.extension(), row_index, e);
            return Ok(false);
        }
    };
    sheet.insert_image_with_offset(row_index, 0, &picture, IMAGE_X_OFFSET_PX, IMAGE_Y_OFFSET_PX)?;
    Ok(true)
}

/// Serializes the rows into an `.xlsx` workbook held in memory.
pub fn build_workbook(rows: &[(ExportRow, Option<EmbeddedImage>)]) -> Result<Vec<u8>> {
    let formats = SheetFormats::new();
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, column) in (0u16..).zip(COLUMNS.iter()) {
        sheet.set_column_width(col, column.width)?;
        sheet.write_string_with_format(0, col, column.header, &formats.header)?;
    }
    sheet.set_row_height(0, HEADER_HEIGHT)?;

    let mut pictures = 0;
    for (row_index, (row, image)) in (1u32..).zip(rows.iter()) {
        write_row(sheet, row_index, row, &formats)?;
        if let Some(image) = image {
            if insert_picture(sheet, row_index, image)? {
                pictures += 1;
            }
        }
    }
    tracing::debug!("Workbook has {} rows and {} pictures", rows.len(), pictures);

    Ok(workbook.save_to_buffer()?)
}
