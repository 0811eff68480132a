use calamine::{Data, Reader, Xlsx};
use chrono::NaiveDate;
use dorm_dashboard::core::avatar::compress_avatar;
use dorm_dashboard::core::export::ExportFormat;
use dorm_dashboard::domain::model::{DormId, Dormitory, Room, Roster, Scope, Student};
use dorm_dashboard::{Exporter, HttpImageSource, LocalStorage, RosterStore};
use httpmock::prelude::*;
use std::io::Cursor;
use tempfile::TempDir;

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([20, 120, 200]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn student(id: &str, name: &str, image_url: Option<String>) -> Student {
    Student {
        id: id.to_string(),
        full_name: name.to_string(),
        course: 2,
        group: "203".to_string(),
        faculty: "Tarix fakulteti".to_string(),
        direction: "Tarix".to_string(),
        image_url,
        joined_date: NaiveDate::from_ymd_opt(2024, 9, 2).unwrap(),
    }
}

#[tokio::test]
async fn test_workbook_embeds_reachable_images_only() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();

    let avatar_mock = server.mock(|when, then| {
        when.method(GET).path("/avatars/aziz.png");
        then.status(200)
            .header("Content-Type", "image/png")
            .body(png_bytes(8, 8));
    });
    let missing_mock = server.mock(|when, then| {
        when.method(GET).path("/avatars/missing.png");
        then.status(404);
    });

    let uploaded = compress_avatar(&png_bytes(300, 200)).unwrap();

    let mut room1 = Room::new(1);
    room1.students.push(student(
        "s1",
        "Karimov Aziz",
        Some(server.url("/avatars/aziz.png")),
    ));
    room1.students.push(student(
        "s2",
        "Aliyeva Madina",
        Some(server.url("/avatars/missing.png")),
    ));
    let mut room2 = Room::new(2);
    room2.students.push(student("s3", "Toshmatov Jasur & Co", Some(uploaded)));
    room2.students.push(student("s4", "Rahimova Nilufar", None));

    let roster = Roster::new(vec![Dormitory::new(
        DormId(1),
        "1-Talabalar turar joyi",
        vec![room1, room2, Room::new(3)],
    )]);
    let store = RosterStore::from_roster(roster).unwrap();

    let exporter = Exporter::new(
        LocalStorage::new(temp_dir.path()),
        HttpImageSource::new(5).unwrap(),
    );
    let date = NaiveDate::from_ymd_opt(2025, 11, 3).unwrap();
    let file_name = exporter
        .export(ExportFormat::Xlsx, store.roster().scoped(Scope::All), date)
        .await
        .unwrap();

    assert_eq!(file_name, "Yotoqxona_Baza_2025-11-03.xlsx");
    avatar_mock.assert();
    missing_mock.assert();

    let data = std::fs::read(temp_dir.path().join(&file_name)).unwrap();

    let archive = zip::ZipArchive::new(Cursor::new(data.clone())).unwrap();
    let media: Vec<&str> = archive
        .file_names()
        .filter(|n| n.starts_with("xl/media/"))
        .collect();
    assert_eq!(media.len(), 2);
    assert_eq!(media.iter().filter(|n| n.ends_with(".png")).count(), 1);

    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(data)).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Talabalar Ro'yxati".to_string()]);
    let range = workbook.worksheet_range("Talabalar Ro'yxati").unwrap();

    let names: Vec<String> = (1..range.height() as u32)
        .filter_map(|row| match range.get_value((row, 3)) {
            Some(Data::String(name)) => Some(name.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        names,
        vec!["Karimov Aziz", "Aliyeva Madina", "Toshmatov Jasur & Co", "Rahimova Nilufar"]
    );
    assert_eq!(range.get_value((3, 2)), Some(&Data::Float(2.0)));
    assert_eq!(range.get_value((4, 6)), Some(&Data::String("Tarix fakulteti".to_string())));
    assert_eq!(range.get_value((4, 8)), Some(&Data::String("2024-09-02".to_string())));
}

#[tokio::test]
async fn test_export_uses_snapshot_taken_at_start() {
    let temp_dir = TempDir::new().unwrap();

    let mut room = Room::new(1);
    room.students.push(student("s1", "Karimov Aziz", None));
    let roster = Roster::new(vec![Dormitory::new(DormId(1), "A bino", vec![room])]);
    let mut store = RosterStore::from_roster(roster).unwrap();

    let snapshot = store.roster().scoped(Scope::All);
    store.remove_student(DormId(1), 1, "s1").unwrap();
    store
        .add_student(DormId(1), 1, student("s2", "Yangi Talaba", None))
        .unwrap();

    let exporter = Exporter::new(
        LocalStorage::new(temp_dir.path()),
        HttpImageSource::new(1).unwrap(),
    );
    let date = NaiveDate::from_ymd_opt(2025, 11, 3).unwrap();
    let file_name = exporter
        .export(ExportFormat::Csv, snapshot, date)
        .await
        .unwrap();

    let csv = std::fs::read_to_string(temp_dir.path().join(file_name)).unwrap();
    assert!(csv.contains("Karimov Aziz"));
    assert!(!csv.contains("Yangi Talaba"));
}
