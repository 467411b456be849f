pub fn classroom_attendance_topic(classroom_id: i64) -> String {
    format!("attendance:classroom:{classroom_id}")
}

pub fn attendance_session_topic(session_id: i64) -> String {
    format!("attendance:session:{session_id}")
}
