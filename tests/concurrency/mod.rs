mod stage_scheduler_test;
