mod sampler_tests;
