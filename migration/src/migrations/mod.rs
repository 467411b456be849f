pub mod m202601100001_create_users;
pub mod m202601100002_create_classrooms;
pub mod m202601100003_create_classroom_members;
pub mod m202601100004_create_attendance;
