pub mod attendance_record;
pub mod attendance_session;
pub mod classroom;
pub mod classroom_member;
pub mod user;

pub use attendance_record::Entity as AttendanceRecord;
pub use attendance_session::Entity as AttendanceSession;
pub use classroom::Entity as Classroom;
pub use classroom_member::Entity as ClassroomMember;
pub use user::Entity as User;
