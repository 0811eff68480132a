//! Plain-text views of the dashboard for the terminal.

use crate::core::aggregator::{ChartPoint, OccupancyStats, SearchHit};
use crate::domain::model::{Dormitory, Room, RoomStatus};
use std::fmt::Write;

const BAR_WIDTH: usize = 30;
const GRID_COLUMNS: usize = 10;

pub fn stats(stats: &OccupancyStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", stats.scope);
    let _ = writeln!(out, "Jami sig'im:     {}", stats.total_capacity);
    let _ = writeln!(out, "Band joylar:     {}", stats.occupied);
    let _ = writeln!(out, "Bo'sh joylar:    {}", stats.free);
    let _ = writeln!(out, "Bandlik:         {}%", stats.occupancy_rate());
    let _ = writeln!(
        out,
        "Xonalar:         {} (bo'sh {}, to'la {}, qisman {})",
        stats.total_rooms, stats.empty_rooms, stats.full_rooms, stats.partial_rooms
    );

    out.push('\n');
    out.push_str(&bar_chart("Joylar bandligi", &stats.occupancy_series()));
    out.push('\n');
    out.push_str(&bar_chart("Kurslar kesimida", &stats.course_series()));
    out.push('\n');
    out.push_str(&bar_chart("Fakultetlar kesimida", &stats.faculty_series()));
    out
}

/// Horizontal bars scaled to the largest value of the series.
pub fn bar_chart(title: &str, points: &[ChartPoint]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title);

    let max = points.iter().map(|p| p.value).max().unwrap_or(0);
    let label_width = points
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0);

    for point in points {
        let len = if max == 0 {
            0
        } else {
            (point.value * BAR_WIDTH).div_ceil(max)
        };
        let pad = label_width - point.name.chars().count();
        let _ = writeln!(
            out,
            "  {}{} | {} {}",
            point.name,
            " ".repeat(pad),
            "█".repeat(len),
            point.value
        );
    }
    out
}

fn status_marker(status: RoomStatus) -> char {
    match status {
        RoomStatus::Empty => '.',
        RoomStatus::Partial => '+',
        RoomStatus::Full => '#',
    }
}

/// Every room of the dormitory as `number[occupancy/capacity]`, with a legend.
pub fn room_grid(dormitory: &Dormitory) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "== {} ({} xona, {} talaba) ==",
        dormitory.name,
        dormitory.total_rooms,
        dormitory.student_count()
    );

    for row in dormitory.rooms.chunks(GRID_COLUMNS) {
        let cells: Vec<String> = row
            .iter()
            .map(|room| {
                format!(
                    "{:>3}{}{}/{}",
                    room.number,
                    status_marker(room.status()),
                    room.occupancy(),
                    room.capacity
                )
            })
            .collect();
        let _ = writeln!(out, "{}", cells.join("  "));
    }

    let _ = writeln!(
        out,
        "\n. {}   + {}   # {}",
        RoomStatus::Empty.label(),
        RoomStatus::Partial.label(),
        RoomStatus::Full.label()
    );
    out
}

pub fn room_detail(dormitory: &Dormitory, room: &Room) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}-xona: {}/{} ({}), bo'sh joy: {}",
        dormitory.name,
        room.number,
        room.occupancy(),
        room.capacity,
        room.status().label(),
        room.free_places()
    );
    if room.students.is_empty() {
        let _ = writeln!(out, "  Xona bo'sh");
    }
    for s in &room.students {
        let _ = writeln!(
            out,
            "  [{}] {} | {}-kurs, {} | {} / {}",
            s.id, s.full_name, s.course, s.group, s.faculty, s.direction
        );
    }
    out
}

pub fn search_results(query: &str, hits: &[SearchHit]) -> String {
    let mut out = String::new();
    if hits.is_empty() {
        let _ = writeln!(out, "\"{}\" bo'yicha hech narsa topilmadi", query);
        return out;
    }
    let _ = writeln!(out, "Topildi: {}", hits.len());
    for hit in hits {
        let _ = writeln!(
            out,
            "  {} | {}, {}-xona | {}-kurs, {}",
            hit.student.full_name, hit.dorm_name, hit.room_number, hit.student.course, hit.student.faculty
        );
    }
    out
}
