//! Store-assigned identifiers for clinic records.

crate::define_id_type!(i64, PatientId);
crate::define_id_type!(i64, DoctorId);
crate::define_id_type!(i64, UserId);
crate::define_id_type!(i64, AppointmentId);
crate::define_id_type!(i64, QueueEntryId);
