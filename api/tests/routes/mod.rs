mod attendance_test;
mod auth_test;
mod classrooms_test;
mod health_test;
