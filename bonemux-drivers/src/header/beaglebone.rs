//! BeagleBone Black expansion headers (P8/P9) and user LEDs

use bonemux_hal::{PinDescriptor, PwmCapability};

use super::HeaderMap;

const EHRPWM0A: PwmCapability = PwmCapability::new("EHRPWM0A", "ehrpwm0", 0);
const EHRPWM0B: PwmCapability = PwmCapability::new("EHRPWM0B", "ehrpwm0", 1);
const EHRPWM1A: PwmCapability = PwmCapability::new("EHRPWM1A", "ehrpwm1", 0);
const EHRPWM1B: PwmCapability = PwmCapability::new("EHRPWM1B", "ehrpwm1", 1);
const EHRPWM2A: PwmCapability = PwmCapability::new("EHRPWM2A", "ehrpwm2", 0);
const EHRPWM2B: PwmCapability = PwmCapability::new("EHRPWM2B", "ehrpwm2", 1);
const ECAPPWM0: PwmCapability = PwmCapability::new("ECAPPWM0", "ecap0", 0);

const PINS: [PinDescriptor; 46] = [
    // P8 header
    PinDescriptor::new("P8_7", "TIMER4").with_gpio(66).with_options(&[
        "gpmc_advn_ale", "", "timer4", "", "", "", "", "gpio2_2",
    ]),
    PinDescriptor::new("P8_8", "TIMER7").with_gpio(67).with_options(&[
        "gpmc_oen_ren", "", "timer7", "", "", "", "", "gpio2_3",
    ]),
    PinDescriptor::new("P8_9", "TIMER5").with_gpio(69).with_options(&[
        "gpmc_ben0_cle", "", "timer5", "", "", "", "", "gpio2_5",
    ]),
    PinDescriptor::new("P8_10", "TIMER6").with_gpio(68).with_options(&[
        "gpmc_wen", "", "timer6", "", "", "", "", "gpio2_4",
    ]),
    PinDescriptor::new("P8_11", "GPIO1_13").with_gpio(45),
    PinDescriptor::new("P8_12", "GPIO1_12").with_gpio(44),
    PinDescriptor::new("P8_13", "EHRPWM2B")
        .with_gpio(23)
        .with_pwm(EHRPWM2B)
        .with_options(&[
            "gpmc_ad9", "lcd_data22", "mmc1_dat1", "mmc2_dat5", "ehrpwm2B", "", "", "gpio0_23",
        ]),
    PinDescriptor::new("P8_14", "GPIO0_26").with_gpio(26),
    PinDescriptor::new("P8_15", "GPIO1_15").with_gpio(47),
    PinDescriptor::new("P8_16", "GPIO1_14").with_gpio(46),
    PinDescriptor::new("P8_17", "GPIO0_27").with_gpio(27),
    PinDescriptor::new("P8_18", "GPIO2_1").with_gpio(65),
    PinDescriptor::new("P8_19", "EHRPWM2A")
        .with_gpio(22)
        .with_pwm(EHRPWM2A)
        .with_options(&[
            "gpmc_ad8", "lcd_data23", "mmc1_dat0", "mmc2_dat4", "ehrpwm2A", "", "", "gpio0_22",
        ]),
    PinDescriptor::new("P8_26", "GPIO1_29").with_gpio(61),
    PinDescriptor::new("P8_34", "UART3_RTSN")
        .with_gpio(81)
        .with_pwm(EHRPWM1B)
        .with_options(&[
            "lcd_data11", "gpmc_a15", "", "mcasp0_ahclkx", "mcasp0_axr2", "", "", "gpio2_17",
        ]),
    PinDescriptor::new("P8_36", "UART3_CTSN")
        .with_gpio(80)
        .with_pwm(EHRPWM1A)
        .with_options(&[
            "lcd_data10", "gpmc_a14", "ehrpwm1A", "mcasp0_axr0", "", "", "", "gpio2_16",
        ]),
    PinDescriptor::new("P8_45", "GPIO2_6")
        .with_gpio(70)
        .with_pwm(EHRPWM2A)
        .with_options(&[
            "lcd_data0", "gpmc_a0", "", "ehrpwm2A", "", "", "", "gpio2_6",
        ]),
    PinDescriptor::new("P8_46", "GPIO2_7")
        .with_gpio(71)
        .with_pwm(EHRPWM2B)
        .with_options(&[
            "lcd_data1", "gpmc_a1", "", "ehrpwm2B", "", "", "", "gpio2_7",
        ]),
    // P9 header
    PinDescriptor::new("P9_11", "UART4_RXD").with_gpio(30),
    PinDescriptor::new("P9_12", "GPIO1_28").with_gpio(60),
    PinDescriptor::new("P9_13", "UART4_TXD").with_gpio(31),
    PinDescriptor::new("P9_14", "EHRPWM1A")
        .with_gpio(50)
        .with_pwm(EHRPWM1A)
        .with_options(&[
            "gpmc_a2", "mii2_txd3", "rgmii2_td3", "mmc2_dat1", "gpmc_a18", "", "ehrpwm1A",
            "gpio1_18",
        ]),
    PinDescriptor::new("P9_15", "GPIO1_16").with_gpio(48),
    PinDescriptor::new("P9_16", "EHRPWM1B")
        .with_gpio(51)
        .with_pwm(EHRPWM1B)
        .with_options(&[
            "gpmc_a3", "mii2_txd2", "rgmii2_td2", "mmc2_dat2", "gpmc_a19", "", "ehrpwm1B",
            "gpio1_19",
        ]),
    PinDescriptor::new("P9_21", "UART2_TXD")
        .with_gpio(3)
        .with_pwm(EHRPWM0B)
        .with_options(&[
            "spi0_d0", "uart2_txd", "i2c2_scl", "ehrpwm0B", "", "", "", "gpio0_3",
        ]),
    PinDescriptor::new("P9_22", "UART2_RXD")
        .with_gpio(2)
        .with_pwm(EHRPWM0A)
        .with_options(&[
            "spi0_sclk", "uart2_rxd", "i2c2_sda", "ehrpwm0A", "", "", "", "gpio0_2",
        ]),
    PinDescriptor::new("P9_23", "GPIO1_17").with_gpio(49),
    PinDescriptor::new("P9_24", "UART1_TXD").with_gpio(15),
    PinDescriptor::new("P9_26", "UART1_RXD").with_gpio(14),
    PinDescriptor::new("P9_27", "GPIO3_19").with_gpio(115),
    PinDescriptor::new("P9_29", "SPI1_D0")
        .with_gpio(111)
        .with_pwm(EHRPWM0B)
        .with_options(&[
            "mcasp0_fsx", "ehrpwm0B", "", "spi1_d0", "", "", "", "gpio3_15",
        ]),
    PinDescriptor::new("P9_30", "SPI1_D1").with_gpio(112),
    PinDescriptor::new("P9_31", "SPI1_SCLK")
        .with_gpio(110)
        .with_pwm(EHRPWM0A)
        .with_options(&[
            "mcasp0_aclkx", "ehrpwm0A", "", "spi1_sclk", "", "", "", "gpio3_14",
        ]),
    PinDescriptor::new("P9_33", "AIN4").with_ain(4),
    PinDescriptor::new("P9_35", "AIN6").with_ain(6),
    PinDescriptor::new("P9_36", "AIN5").with_ain(5),
    PinDescriptor::new("P9_37", "AIN2").with_ain(2),
    PinDescriptor::new("P9_38", "AIN3").with_ain(3),
    PinDescriptor::new("P9_39", "AIN0").with_ain(0),
    PinDescriptor::new("P9_40", "AIN1").with_ain(1),
    PinDescriptor::new("P9_41", "CLKOUT2").with_gpio(20),
    PinDescriptor::new("P9_42", "GPIO0_7")
        .with_gpio(7)
        .with_pwm(ECAPPWM0)
        .with_options(&[
            "ecap0_in_pwm0_out", "uart3_txd", "spi1_cs1", "pr1_ecap0_ecap_capin_apwm_o",
            "spi1_sclk", "mmc0_sdwp", "xdma_event_intr2", "gpio0_7",
        ]),
    // User LEDs
    PinDescriptor::new("USR0", "USR0").with_gpio(53).as_led(),
    PinDescriptor::new("USR1", "USR1").with_gpio(54).as_led(),
    PinDescriptor::new("USR2", "USR2").with_gpio(55).as_led(),
    PinDescriptor::new("USR3", "USR3").with_gpio(56).as_led(),
];

/// BeagleBone Black header pins
pub static BEAGLEBONE_BLACK: HeaderMap = HeaderMap::new(&PINS);
